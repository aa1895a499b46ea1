use clap::Parser;
use vllm_keepalive::utils::{logger, validation::Validate};
use vllm_keepalive::{
    listen_for_signals, KeepAliveArgs, KeepAliveConfig, KeepAliveError, KeepAliveService,
    OpenAiClient, PartialConfig, ServiceOutcome, ShutdownController,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = KeepAliveArgs::parse();

    // 載入設定檔（若有指定）
    let file_config = match &args.config {
        Some(path) => match PartialConfig::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                // 設定檔讀不到時仍以命令列指定的格式輸出到 stdout
                logger::init_logger(args.verbose, args.log_format.unwrap_or_default());
                fail(&e);
            }
        },
        None => None,
    };

    let config = KeepAliveConfig::resolve(args.to_partial(), file_config);

    // 初始化日誌
    logger::init_logger(args.verbose, config.log_format);

    if let Err(e) = config.validate() {
        fail(&e);
    }
    config.log_summary();
    if let Ok(json) = serde_json::to_string(&config) {
        tracing::debug!("Resolved config: {}", json);
    }

    let shutdown = ShutdownController::new();
    listen_for_signals(shutdown.clone());

    let client = match OpenAiClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => fail(&e),
    };

    let service = KeepAliveService::new(
        client,
        config.readiness_policy(),
        config.keepalive_policy(),
        shutdown,
    );

    match service.run().await {
        Ok(ServiceOutcome::Stopped(_)) | Ok(ServiceOutcome::CancelledBeforeReady) => {
            tracing::info!("Service stopped");
        }
        Err(e) => fail(&e),
    }
}

fn fail(e: &KeepAliveError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e.user_friendly_message(),
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
