// ABOUTME: Log operations trait for container engines.
// ABOUTME: Stream container logs with filtering options.

use super::sealed::Sealed;
use crate::types::ContainerId;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Log streaming operations.
#[async_trait]
pub trait LogOps: Sealed + Send + Sync {
    /// Stream logs from a container. With `follow` set, the stream closes
    /// when the container exits; lines arrive in engine emission order.
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<LogLine, LogError>> + Send>>, LogError>;
}

/// Options for log streaming.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Include stdout.
    pub stdout: bool,
    /// Include stderr.
    pub stderr: bool,
    /// Follow log output until the container exits.
    pub follow: bool,
}

impl LogOptions {
    /// Follow both streams until the container exits.
    pub fn follow_all() -> Self {
        Self {
            stdout: true,
            stderr: true,
            follow: true,
        }
    }
}

/// A single log line from a container.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub content: String,
    pub stream: LogStream,
}

/// Log stream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// Errors from log operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("stream error: {0}")]
    StreamError(String),

    #[error("engine error: {0}")]
    Engine(String),
}
