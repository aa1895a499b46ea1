use crate::core::shutdown::ShutdownController;
use crate::domain::model::{CompletionRequest, KeepAliveStats};
use crate::domain::ports::InferenceClient;
use std::time::Duration;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_POLL_STEP: Duration = Duration::from_secs(1);

/// 每連續失敗這麼多次額外提醒一次
const FAILURE_STREAK_REPORT_EVERY: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAlivePolicy {
    pub model: String,
    pub interval: Duration,
    /// 睡眠時檢查關閉旗標的粒度
    pub poll_step: Duration,
}

impl KeepAlivePolicy {
    pub fn new(model: impl Into<String>, interval: Duration) -> Self {
        Self {
            model: model.into(),
            interval,
            poll_step: DEFAULT_POLL_STEP,
        }
    }

    pub fn with_poll_step(mut self, poll_step: Duration) -> Self {
        self.poll_step = poll_step;
        self
    }
}

pub struct KeepAliveLoop<'a, C: InferenceClient + ?Sized> {
    client: &'a C,
    policy: KeepAlivePolicy,
    shutdown: ShutdownController,
    stats: KeepAliveStats,
}

impl<'a, C: InferenceClient + ?Sized> KeepAliveLoop<'a, C> {
    pub fn new(client: &'a C, policy: KeepAlivePolicy, shutdown: ShutdownController) -> Self {
        Self {
            client,
            policy,
            shutdown,
            stats: KeepAliveStats::new(),
        }
    }

    /// 執行直到收到關閉請求；單次請求失敗不會中止迴圈
    pub async fn run(mut self) -> KeepAliveStats {
        tracing::info!(
            "Starting keep-alive loop (interval: {}s, model: {})",
            self.policy.interval.as_secs_f64(),
            self.policy.model
        );

        let request = CompletionRequest::keep_alive(self.policy.model.clone());

        while !self.shutdown.is_shutdown_requested() {
            if self.sleep_interval().await {
                break;
            }
            self.send_once(&request).await;
        }

        tracing::debug!(
            "Keep-alive loop exited after {} requests",
            self.stats.total_requests()
        );
        self.stats
    }

    /// 以 poll_step 為單位睡滿一個 interval，中途收到關閉請求回傳 true
    async fn sleep_interval(&self) -> bool {
        let step = self.policy.poll_step.max(Duration::from_millis(1));
        let mut remaining = self.policy.interval;

        while !remaining.is_zero() {
            let chunk = remaining.min(step);
            if self.shutdown.sleep_or_shutdown(chunk).await {
                return true;
            }
            remaining -= chunk;
        }

        self.shutdown.is_shutdown_requested()
    }

    async fn send_once(&mut self, request: &CompletionRequest) {
        match self.client.complete(request).await {
            Ok(response) => {
                let recovered_after = self.stats.consecutive_failures;
                let count = self.stats.record_success(&response);
                if recovered_after > 0 {
                    tracing::info!(
                        "Keep-alive recovered after {} failed attempts",
                        recovered_after
                    );
                }
                tracing::info!(
                    "Keep-alive #{} OK (tokens: {})",
                    count,
                    self.stats.last_token_label()
                );
            }
            Err(e) => {
                let streak = self.stats.record_failure();
                tracing::warn!("Keep-alive failed: {}", e);
                if streak % FAILURE_STREAK_REPORT_EVERY == 0 {
                    tracing::warn!(
                        "⚠️ {} consecutive keep-alive failures ({})",
                        streak,
                        e.recovery_suggestion()
                    );
                }
            }
        }
    }
}
