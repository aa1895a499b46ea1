use crate::domain::model::{CompletionRequest, CompletionResponse};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 推論伺服器的最小介面：就緒檢查與補全請求
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn check_ready(&self) -> Result<()>;
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}

pub trait ConfigProvider: Send + Sync {
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn model(&self) -> &str;
    fn api_key(&self) -> &str;
    fn keepalive_interval(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn ready_max_retries(&self) -> u32;
    fn ready_retry_interval(&self) -> Duration;
    fn readiness_probe(&self) -> ReadinessProbe;

    fn base_url(&self) -> String {
        format!("http://{}:{}/v1", self.host(), self.port())
    }

    fn health_url(&self) -> String {
        format!("http://{}:{}/health", self.host(), self.port())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReadinessProbe {
    /// GET /v1/models
    #[default]
    Models,
    /// GET /health
    Health,
}

#[async_trait]
impl<T: InferenceClient + ?Sized> InferenceClient for std::sync::Arc<T> {
    async fn check_ready(&self) -> Result<()> {
        (**self).check_ready().await
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        (**self).complete(request).await
    }
}

impl std::fmt::Display for ReadinessProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadinessProbe::Models => f.write_str("models"),
            ReadinessProbe::Health => f.write_str("health"),
        }
    }
}
