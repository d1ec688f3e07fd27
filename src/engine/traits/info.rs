// ABOUTME: Engine info trait for container engines.
// ABOUTME: Connectivity checks against the engine daemon.

use super::sealed::Sealed;
use async_trait::async_trait;

/// Engine connectivity operations.
#[async_trait]
pub trait EngineInfo: Sealed + Send + Sync {
    /// Ping the engine to check connectivity.
    async fn ping(&self) -> Result<(), EngineInfoError>;
}

/// Errors from engine info operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineInfoError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("engine error: {0}")]
    Engine(String),
}
