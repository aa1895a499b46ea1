pub mod keepalive;
pub mod readiness;
pub mod service;
pub mod shutdown;

pub use crate::domain::model::{CompletionRequest, CompletionResponse, KeepAliveStats, ReadinessOutcome};
pub use crate::domain::ports::{ConfigProvider, InferenceClient, ReadinessProbe};
pub use crate::utils::error::Result;
