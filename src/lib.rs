pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::KeepAliveArgs;

pub use adapters::OpenAiClient;
pub use config::{toml_config::PartialConfig, KeepAliveConfig};
pub use self::core::{
    keepalive::{KeepAliveLoop, KeepAlivePolicy},
    readiness::{wait_for_server, ReadinessPolicy},
    service::{KeepAliveService, ServiceOutcome},
    shutdown::{listen_for_signals, ShutdownController},
};
pub use utils::error::{KeepAliveError, Result};
