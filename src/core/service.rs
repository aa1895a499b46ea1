use crate::core::keepalive::{KeepAliveLoop, KeepAlivePolicy};
use crate::core::readiness::{wait_for_server, ReadinessPolicy};
use crate::core::shutdown::ShutdownController;
use crate::domain::model::{KeepAliveStats, ReadinessOutcome};
use crate::domain::ports::InferenceClient;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub enum ServiceOutcome {
    /// 在等待就緒期間被要求關閉
    CancelledBeforeReady,
    Stopped(KeepAliveStats),
}

/// 先等待伺服器就緒，再進入 keep-alive 迴圈
pub struct KeepAliveService<C: InferenceClient> {
    client: C,
    readiness: ReadinessPolicy,
    keepalive: KeepAlivePolicy,
    shutdown: ShutdownController,
}

impl<C: InferenceClient> KeepAliveService<C> {
    pub fn new(
        client: C,
        readiness: ReadinessPolicy,
        keepalive: KeepAlivePolicy,
        shutdown: ShutdownController,
    ) -> Self {
        Self {
            client,
            readiness,
            keepalive,
            shutdown,
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownController {
        self.shutdown.clone()
    }

    pub async fn run(&self) -> Result<ServiceOutcome> {
        match wait_for_server(&self.client, self.readiness, &self.shutdown).await? {
            ReadinessOutcome::Ready { .. } => {}
            ReadinessOutcome::Cancelled { attempts } => {
                tracing::info!("Stopped before server became ready ({} attempts)", attempts);
                return Ok(ServiceOutcome::CancelledBeforeReady);
            }
        }

        let stats = KeepAliveLoop::new(&self.client, self.keepalive.clone(), self.shutdown.clone())
            .run()
            .await;

        tracing::info!(
            "Keep-alive summary: {} ok, {} failed",
            stats.successful_requests,
            stats.failed_requests
        );
        if let Ok(json) = serde_json::to_string(&stats) {
            tracing::debug!("Keep-alive stats: {}", json);
        }

        Ok(ServiceOutcome::Stopped(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CompletionRequest, CompletionResponse};
    use crate::utils::error::KeepAliveError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct CountingServer {
        not_ready_for: u32,
        ready_checks: AtomicU32,
        completions: AtomicU32,
    }

    #[async_trait]
    impl InferenceClient for CountingServer {
        async fn check_ready(&self) -> crate::utils::error::Result<()> {
            let call = self.ready_checks.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.not_ready_for {
                return Err(KeepAliveError::UnexpectedStatus {
                    status: 503,
                    body: String::new(),
                });
            }
            Ok(())
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> crate::utils::error::Result<CompletionResponse> {
            self.completions.fetch_add(1, Ordering::SeqCst);
            Ok(CompletionResponse::default())
        }
    }

    fn service(server: Arc<CountingServer>, retries: u32) -> KeepAliveService<Arc<CountingServer>> {
        KeepAliveService::new(
            server,
            ReadinessPolicy {
                max_retries: retries,
                retry_interval: Duration::from_millis(50),
            },
            KeepAlivePolicy::new("test-model", Duration::from_millis(500))
                .with_poll_step(Duration::from_millis(100)),
            ShutdownController::new(),
        )
    }

    #[tokio::test]
    async fn test_never_ready_issues_no_keepalive() {
        let server = Arc::new(CountingServer {
            not_ready_for: u32::MAX,
            ..CountingServer::default()
        });

        let result = service(server.clone(), 3).run().await;

        let err = result.unwrap_err();
        assert!(matches!(err, KeepAliveError::ServerNotReady { attempts: 3 }));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(server.ready_checks.load(Ordering::SeqCst), 3);
        assert_eq!(server.completions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ready_then_shutdown_mid_sleep() {
        // 三次失敗後就緒，接著在第一次 keep-alive 睡眠中途關閉
        let server = Arc::new(CountingServer {
            not_ready_for: 3,
            ..CountingServer::default()
        });
        let service = service(server.clone(), 5);
        let trigger = service.shutdown_handle();

        let start = Instant::now();
        let run = tokio::spawn(async move { service.run().await });

        tokio::time::sleep(Duration::from_millis(350)).await;
        trigger.request_shutdown();

        let outcome = tokio::time::timeout(Duration::from_secs(2), run)
            .await
            .expect("service did not stop")
            .expect("service task panicked")
            .unwrap();
        let elapsed = start.elapsed();

        assert!(matches!(outcome, ServiceOutcome::Stopped(_)));
        assert_eq!(server.ready_checks.load(Ordering::SeqCst), 4);
        assert_eq!(server.completions.load(Ordering::SeqCst), 0);
        assert!(elapsed < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_shutdown_during_readiness_wait() {
        let server = Arc::new(CountingServer {
            not_ready_for: u32::MAX,
            ..CountingServer::default()
        });
        let service = service(server.clone(), 100);
        service.shutdown_handle().request_shutdown();

        let outcome = service.run().await.unwrap();

        assert!(matches!(outcome, ServiceOutcome::CancelledBeforeReady));
        assert_eq!(server.completions.load(Ordering::SeqCst), 0);
    }
}
