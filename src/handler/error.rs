// ABOUTME: Error taxonomy for the image handler state machine.
// ABOUTME: Distinguishes state violations from engine-side failures.

use super::HandlerState;
use crate::engine::EngineError;
use crate::engine::traits::{ContainerError, ExecError, ImageError, LogError};
use thiserror::Error;

/// Errors from handler operations. All are terminal for the current
/// command invocation; none are retried.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("no repository image found under name {0}")]
    ImageNotFound(String),

    #[error("operation not supported in {state} state: {reason}")]
    UnsupportedOperation {
        state: HandlerState,
        reason: &'static str,
    },

    #[error("command `{command}` failed with exit code {exit_code}")]
    CommandFailed { command: String, exit_code: i64 },

    #[error("cannot commit to a pulled image; tag it into a repository first")]
    CommitRejected,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<ImageError> for HandlerError {
    fn from(source: ImageError) -> Self {
        HandlerError::Engine(source.into())
    }
}

impl From<ContainerError> for HandlerError {
    fn from(source: ContainerError) -> Self {
        HandlerError::Engine(source.into())
    }
}

impl From<ExecError> for HandlerError {
    fn from(source: ExecError) -> Self {
        HandlerError::Engine(source.into())
    }
}

impl From<LogError> for HandlerError {
    fn from(source: LogError) -> Self {
        HandlerError::Engine(source.into())
    }
}
