use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// keep-alive 固定使用的最小輸入
pub const KEEPALIVE_PROMPT: &str = "hi";
pub const KEEPALIVE_MAX_TOKENS: u32 = 1;

/// 回應缺少 usage 時記錄的標記
pub const TOKENS_UNAVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    /// 最小成本、可重現的請求：一個 token、temperature 0
    pub fn keep_alive(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: KEEPALIVE_PROMPT.to_string(),
            max_tokens: KEEPALIVE_MAX_TOKENS,
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: Option<String>,
    pub model: Option<String>,
    pub usage: Option<Usage>,
}

impl CompletionResponse {
    pub fn total_tokens(&self) -> Option<u64> {
        self.usage.as_ref().and_then(|usage| usage.total_tokens)
    }
}

/// 日誌用的 token 數顯示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCount(pub Option<u64>);

impl fmt::Display for TokenCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(tokens) => write!(f, "{}", tokens),
            None => f.write_str(TOKENS_UNAVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelInfo>,
}

impl ModelList {
    pub fn contains(&self, model: &str) -> bool {
        self.data.iter().any(|info| info.id == model)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.data.iter().map(|info| info.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessOutcome {
    Ready { attempts: u32 },
    Cancelled { attempts: u32 },
}

#[derive(Debug, Clone, Serialize)]
pub struct KeepAliveStats {
    pub started_at: DateTime<Local>,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub consecutive_failures: u64,
    pub last_success_at: Option<DateTime<Local>>,
    /// 最近一次成功回應回報的 token 數
    pub last_total_tokens: Option<u64>,
}

impl KeepAliveStats {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            successful_requests: 0,
            failed_requests: 0,
            consecutive_failures: 0,
            last_success_at: None,
            last_total_tokens: None,
        }
    }

    /// 記錄一次成功，回傳新的計數
    pub fn record_success(&mut self, response: &CompletionResponse) -> u64 {
        self.successful_requests += 1;
        self.consecutive_failures = 0;
        self.last_success_at = Some(Local::now());
        self.last_total_tokens = response.total_tokens();
        self.successful_requests
    }

    pub fn last_token_label(&self) -> TokenCount {
        TokenCount(self.last_total_tokens)
    }

    pub fn record_failure(&mut self) -> u64 {
        self.failed_requests += 1;
        self.consecutive_failures += 1;
        self.consecutive_failures
    }

    pub fn total_requests(&self) -> u64 {
        self.successful_requests + self.failed_requests
    }
}

impl Default for KeepAliveStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_alive_request_wire_shape() {
        let request = CompletionRequest::keep_alive("Qwen/Qwen3-4B-Instruct-2507-FP8");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "model": "Qwen/Qwen3-4B-Instruct-2507-FP8",
                "prompt": "hi",
                "max_tokens": 1,
                "temperature": 0.0
            })
        );
    }

    #[test]
    fn test_response_without_usage_reports_marker() {
        let response: CompletionResponse =
            serde_json::from_str(r#"{"id": "cmpl-1", "choices": [{"text": "!"}]}"#).unwrap();

        assert_eq!(response.total_tokens(), None);
        assert_eq!(TokenCount(response.total_tokens()).to_string(), "N/A");
    }

    #[test]
    fn test_response_with_usage_reports_total() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}}"#,
        )
        .unwrap();

        assert_eq!(TokenCount(response.total_tokens()).to_string(), "2");
    }

    #[test]
    fn test_model_list_lookup() {
        let list: ModelList = serde_json::from_str(
            r#"{"object": "list", "data": [{"id": "a", "object": "model"}, {"id": "b"}]}"#,
        )
        .unwrap();

        assert!(list.contains("b"));
        assert!(!list.contains("c"));
        assert_eq!(list.ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_stats_counters() {
        let mut stats = KeepAliveStats::new();
        assert_eq!(stats.record_failure(), 1);
        assert_eq!(stats.record_failure(), 2);
        assert_eq!(stats.record_success(&CompletionResponse::default()), 1);
        assert_eq!(stats.consecutive_failures, 0);
        assert_eq!(stats.last_token_label().to_string(), "N/A");
        assert_eq!(stats.total_requests(), 3);
        assert!(stats.last_success_at.is_some());
    }
}
