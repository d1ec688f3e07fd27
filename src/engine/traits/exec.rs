// ABOUTME: Exec operations trait for container engines.
// ABOUTME: Execute commands inside running containers.

use super::sealed::Sealed;
use crate::types::ContainerId;
use async_trait::async_trait;

/// Exec operations: run commands in already-running containers.
#[async_trait]
pub trait ExecOps: Sealed + Send + Sync {
    /// Run a command inside a running container, attached, and collect
    /// its output lines in arrival order.
    async fn exec(&self, container: &ContainerId, cmd: &[String])
    -> Result<ExecResult, ExecError>;
}

/// Result of an exec invocation.
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub exit_code: i64,
    /// Combined stdout/stderr lines in the order the engine emitted them.
    pub output: Vec<String>,
}

/// Errors from exec operations.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("container not running: {0}")]
    ContainerNotRunning(String),

    #[error("exec failed: {0}")]
    Failed(String),

    #[error("engine error: {0}")]
    Engine(String),
}
