use crate::domain::model::{CompletionRequest, CompletionResponse, ModelList};
use crate::domain::ports::{ConfigProvider, InferenceClient, ReadinessProbe};
use crate::utils::error::{KeepAliveError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

/// 錯誤訊息中保留的回應內容上限
const MAX_ERROR_BODY_CHARS: usize = 200;

/// OpenAI 相容 API（vLLM）的 HTTP 客戶端
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    health_url: String,
    api_key: String,
    model: String,
    probe: ReadinessProbe,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        health_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        probe: ReadinessProbe,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            health_url: health_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            probe,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.base_url(),
            config.health_url(),
            config.api_key(),
            config.model(),
            config.readiness_probe(),
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_models(&self) -> Result<ModelList> {
        let url = format!("{}/models", self.base_url);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        Ok(response.json::<ModelList>().await?)
    }

    async fn check_health(&self) -> Result<()> {
        tracing::debug!("GET {}", self.health_url);

        let response = self.client.get(&self.health_url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl InferenceClient for OpenAiClient {
    async fn check_ready(&self) -> Result<()> {
        match self.probe {
            ReadinessProbe::Health => self.check_health().await,
            ReadinessProbe::Models => {
                let models = self.list_models().await?;
                tracing::debug!("Served models: {:?}", models.ids());

                if !models.contains(&self.model) {
                    tracing::warn!(
                        "⚠️ Model '{}' is not in the served model list {:?}",
                        self.model,
                        models.ids()
                    );
                }
                Ok(())
            }
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let url = format!("{}/completions", self.base_url);
        tracing::debug!("POST {} (model: {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        Ok(response.json::<CompletionResponse>().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(KeepAliveError::UnexpectedStatus {
        status: status.as_u16(),
        body: truncate(&body, MAX_ERROR_BODY_CHARS),
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
