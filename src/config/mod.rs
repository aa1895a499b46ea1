#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::keepalive::KeepAlivePolicy;
use crate::core::readiness::ReadinessPolicy;
use crate::domain::ports::{ConfigProvider, ReadinessProbe};
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use crate::utils::validation::{self, Validate};
use serde::Serialize;
use std::time::Duration;
use self::toml_config::PartialConfig;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_MODEL: &str = "Qwen/Qwen3-4B-Instruct-2507-FP8";
pub const DEFAULT_API_KEY: &str = "not-needed";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_READY_MAX_RETRIES: u32 = 60;
pub const DEFAULT_READY_RETRY_INTERVAL_SECS: u64 = 5;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// 套用預設值後的完整設定
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeepAliveConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub interval_secs: u64,
    pub request_timeout_secs: u64,
    pub ready_max_retries: u32,
    pub ready_retry_interval_secs: u64,
    pub readiness_probe: ReadinessProbe,
    pub log_format: LogFormat,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self::from_partial(PartialConfig::default())
    }
}

impl KeepAliveConfig {
    pub fn from_partial(partial: PartialConfig) -> Self {
        Self {
            host: partial.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: partial.port.unwrap_or(DEFAULT_PORT),
            model: partial.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: partial.api_key.unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
            interval_secs: partial.interval.unwrap_or(DEFAULT_INTERVAL_SECS),
            request_timeout_secs: partial
                .request_timeout
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ready_max_retries: partial.ready_max_retries.unwrap_or(DEFAULT_READY_MAX_RETRIES),
            ready_retry_interval_secs: partial
                .ready_retry_interval
                .unwrap_or(DEFAULT_READY_RETRY_INTERVAL_SECS),
            readiness_probe: partial.readiness_probe.unwrap_or_default(),
            log_format: partial.log_format.unwrap_or_default(),
        }
    }

    /// 優先順序：命令列/環境變數 > 設定檔 > 預設值
    pub fn resolve(overrides: PartialConfig, file: Option<PartialConfig>) -> Self {
        let merged = match file {
            Some(file) => overrides.merge(file),
            None => overrides,
        };
        Self::from_partial(merged)
    }

    pub fn readiness_policy(&self) -> ReadinessPolicy {
        ReadinessPolicy {
            max_retries: self.ready_max_retries,
            retry_interval: self.ready_retry_interval(),
        }
    }

    pub fn keepalive_policy(&self) -> KeepAlivePolicy {
        KeepAlivePolicy::new(self.model.clone(), self.keepalive_interval())
    }

    /// 啟動時輸出設定摘要
    pub fn log_summary(&self) {
        tracing::info!("VLLM Keep-Alive Service");
        tracing::info!("Target: {}", self.base_url());
        tracing::info!("Model: {}", self.model);
        tracing::info!("Interval: {}s", self.interval_secs);
        tracing::debug!(
            "Readiness: probe={}, retries={}, retry_interval={}s, request_timeout={}s",
            self.readiness_probe,
            self.ready_max_retries,
            self.ready_retry_interval_secs,
            self.request_timeout_secs
        );
    }
}

impl ConfigProvider for KeepAliveConfig {
    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn ready_max_retries(&self) -> u32 {
        self.ready_max_retries
    }

    fn ready_retry_interval(&self) -> Duration {
        Duration::from_secs(self.ready_retry_interval_secs)
    }

    fn readiness_probe(&self) -> ReadinessProbe {
        self.readiness_probe
    }
}

impl Validate for KeepAliveConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("host", &self.host)?;
        validation::validate_positive_number("port", self.port, 1)?;
        validation::validate_non_empty_string("model", &self.model)?;
        validation::validate_positive_number("interval", self.interval_secs, 1)?;
        validation::validate_range(
            "request_timeout",
            self.request_timeout_secs,
            1,
            MAX_REQUEST_TIMEOUT_SECS,
        )?;
        validation::validate_positive_number("ready_max_retries", self.ready_max_retries, 1)?;
        validation::validate_positive_number(
            "ready_retry_interval",
            self.ready_retry_interval_secs,
            1,
        )?;
        validation::validate_base_url("base_url", &self.base_url())?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::KeepAliveError;

    #[test]
    fn test_defaults() {
        let config = KeepAliveConfig::default();

        assert_eq!(config.base_url(), "http://localhost:8081/v1");
        assert_eq!(config.health_url(), "http://localhost:8081/health");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_key, "not-needed");
        assert_eq!(config.keepalive_interval(), Duration::from_secs(60));
        assert_eq!(config.readiness_policy(), ReadinessPolicy::default());
        assert_eq!(config.readiness_probe, ReadinessProbe::Models);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_precedence() {
        let overrides = PartialConfig {
            model: Some("cli-model".to_string()),
            ..PartialConfig::default()
        };
        let file = PartialConfig {
            model: Some("file-model".to_string()),
            interval: Some(15),
            ..PartialConfig::default()
        };

        let config = KeepAliveConfig::resolve(overrides, Some(file));

        assert_eq!(config.model, "cli-model");
        assert_eq!(config.interval_secs, 15);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = KeepAliveConfig {
            interval_secs: 0,
            ..KeepAliveConfig::default()
        };

        match config.validate() {
            Err(KeepAliveError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "interval")
            }
            other => panic!("expected invalid interval, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_host_rejected() {
        let config = KeepAliveConfig {
            host: "bad host".to_string(),
            ..KeepAliveConfig::default()
        };
        assert!(config.validate().is_err());

        let config = KeepAliveConfig {
            host: " ".to_string(),
            ..KeepAliveConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policies_follow_config() {
        let config = KeepAliveConfig {
            interval_secs: 5,
            ready_max_retries: 3,
            ..KeepAliveConfig::default()
        };

        let keepalive = config.keepalive_policy();
        assert_eq!(keepalive.interval, Duration::from_secs(5));
        assert_eq!(keepalive.poll_step, Duration::from_secs(1));
        assert_eq!(keepalive.model, DEFAULT_MODEL);
        assert_eq!(config.readiness_policy().max_retries, 3);
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = KeepAliveConfig {
            api_key: "secret".to_string(),
            ..KeepAliveConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
