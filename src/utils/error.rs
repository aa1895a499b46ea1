use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeepAliveError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected response status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Server did not become available after {attempts} attempts")]
    ServerNotReady { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Startup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
}

impl KeepAliveError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            KeepAliveError::HttpError(_) | KeepAliveError::UnexpectedStatus { .. } => {
                ErrorCategory::Network
            }
            KeepAliveError::TomlParseError(_)
            | KeepAliveError::ConfigError { .. }
            | KeepAliveError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            KeepAliveError::ServerNotReady { .. } => ErrorCategory::Startup,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單次 keep-alive 失敗只記錄警告，迴圈會繼續
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Startup => ErrorSeverity::High,
        }
    }

    /// 程序退出碼：1 只用於伺服器未就緒，其餘啟動失敗皆為 2
    pub fn exit_code(&self) -> i32 {
        match self {
            KeepAliveError::ServerNotReady { .. } => 1,
            _ => 2,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            KeepAliveError::HttpError(e) if e.is_timeout() => {
                "Increase KEEPALIVE_REQUEST_TIMEOUT or check the server load"
            }
            KeepAliveError::HttpError(_) => {
                "Check that the vLLM server is running and VLLM_HOST/VLLM_PORT are correct"
            }
            KeepAliveError::UnexpectedStatus { .. } => {
                "Check the server logs and that VLLM_MODEL is served by this instance"
            }
            KeepAliveError::ServerNotReady { .. } => {
                "Raise READY_MAX_RETRIES or READY_RETRY_INTERVAL if the model takes longer to load"
            }
            KeepAliveError::TomlParseError(_) => "Fix the syntax of the configuration file",
            KeepAliveError::ConfigError { .. } => {
                "Check that the configuration file exists and is readable"
            }
            KeepAliveError::InvalidConfigValueError { .. } => {
                "Review the command line flags and environment variables"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            KeepAliveError::ServerNotReady { attempts } => format!(
                "The inference server did not become ready after {} attempts",
                attempts
            ),
            KeepAliveError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration for '{}': {}", field, reason)
            }
            KeepAliveError::ConfigError { message } => format!("Configuration problem: {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KeepAliveError>;
