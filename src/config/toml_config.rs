use crate::domain::ports::ReadinessProbe;
use crate::utils::error::{KeepAliveError, Result};
use crate::utils::logger::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 一層尚未套用預設值的設定（命令列/環境變數或 TOML 檔）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub interval: Option<u64>,
    pub request_timeout: Option<u64>,
    pub ready_max_retries: Option<u32>,
    pub ready_retry_interval: Option<u64>,
    pub readiness_probe: Option<ReadinessProbe>,
    pub log_format: Option<LogFormat>,
}

impl PartialConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| KeepAliveError::ConfigError {
                message: format!("cannot read '{}': {}", path.display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// `self` 的值優先，缺少的欄位才使用 `lower`
    pub fn merge(self, lower: PartialConfig) -> PartialConfig {
        PartialConfig {
            host: self.host.or(lower.host),
            port: self.port.or(lower.port),
            model: self.model.or(lower.model),
            api_key: self.api_key.or(lower.api_key),
            interval: self.interval.or(lower.interval),
            request_timeout: self.request_timeout.or(lower.request_timeout),
            ready_max_retries: self.ready_max_retries.or(lower.ready_max_retries),
            ready_retry_interval: self.ready_retry_interval.or(lower.ready_retry_interval),
            readiness_probe: self.readiness_probe.or(lower.readiness_probe),
            log_format: self.log_format.or(lower.log_format),
        }
    }
}
