use crate::config::toml_config::PartialConfig;
use crate::domain::ports::ReadinessProbe;
use crate::utils::logger::LogFormat;
use clap::Parser;
use std::path::PathBuf;

/// 命令列參數；未指定時由 clap 讀取對應的環境變數
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "vllm-keepalive")]
#[command(about = "Keeps a vLLM server warm by sending periodic minimal completion requests")]
pub struct KeepAliveArgs {
    /// vLLM server host
    #[arg(long, env = "VLLM_HOST")]
    pub host: Option<String>,

    /// vLLM server port
    #[arg(long, env = "VLLM_PORT")]
    pub port: Option<u16>,

    /// Model to send keep-alive requests to
    #[arg(long, env = "VLLM_MODEL")]
    pub model: Option<String>,

    /// Bearer token sent to the server
    #[arg(long, env = "VLLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Seconds between keep-alive requests
    #[arg(long, env = "KEEPALIVE_INTERVAL")]
    pub interval: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, env = "KEEPALIVE_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Readiness attempts before giving up
    #[arg(long, env = "READY_MAX_RETRIES")]
    pub ready_max_retries: Option<u32>,

    /// Seconds between readiness attempts
    #[arg(long, env = "READY_RETRY_INTERVAL")]
    pub ready_retry_interval: Option<u64>,

    /// Endpoint used for the readiness check
    #[arg(long, env = "READY_PROBE", value_enum)]
    pub readiness_probe: Option<ReadinessProbe>,

    /// Log output format
    #[arg(long, env = "KEEPALIVE_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "KEEPALIVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl KeepAliveArgs {
    pub fn to_partial(&self) -> PartialConfig {
        PartialConfig {
            host: self.host.clone(),
            port: self.port,
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            interval: self.interval,
            request_timeout: self.request_timeout,
            ready_max_retries: self.ready_max_retries,
            ready_retry_interval: self.ready_retry_interval,
            readiness_probe: self.readiness_probe,
            log_format: self.log_format,
        }
    }
}
