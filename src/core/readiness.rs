use crate::core::shutdown::ShutdownController;
use crate::domain::model::ReadinessOutcome;
use crate::domain::ports::InferenceClient;
use crate::utils::error::{KeepAliveError, Result};
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 60;
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub max_retries: u32,
    pub retry_interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// 等待推論伺服器就緒。
///
/// 每次失敗後固定等待 `retry_interval`（沒有退避），用完重試次數回傳
/// `ServerNotReady`。等待期間收到關閉請求時回傳 `Cancelled`。
pub async fn wait_for_server<C: InferenceClient + ?Sized>(
    client: &C,
    policy: ReadinessPolicy,
    shutdown: &ShutdownController,
) -> Result<ReadinessOutcome> {
    tracing::info!("Waiting for VLLM server...");

    for attempt in 1..=policy.max_retries {
        if shutdown.is_shutdown_requested() {
            return Ok(ReadinessOutcome::Cancelled {
                attempts: attempt - 1,
            });
        }

        match client.check_ready().await {
            Ok(()) => {
                tracing::info!("VLLM server ready (attempt {})", attempt);
                return Ok(ReadinessOutcome::Ready { attempts: attempt });
            }
            Err(e) => {
                tracing::debug!("Readiness check failed: {}", e);
                tracing::info!(
                    "Not ready, retrying in {}s ({}/{})",
                    policy.retry_interval.as_secs_f64(),
                    attempt,
                    policy.max_retries
                );
            }
        }

        if shutdown.sleep_or_shutdown(policy.retry_interval).await {
            tracing::info!("Shutdown requested while waiting for server");
            return Ok(ReadinessOutcome::Cancelled { attempts: attempt });
        }
    }

    tracing::error!("Server did not become available");
    Err(KeepAliveError::ServerNotReady {
        attempts: policy.max_retries,
    })
}
