// ABOUTME: Unified engine error with SNAFU pattern.
// ABOUTME: Wraps connection and capability errors for programmatic handling.

use snafu::Snafu;

use super::connect::ConnectError;
use super::traits::{ContainerError, EngineInfoError, ExecError, ImageError, LogError};

/// Unified engine error across connection and capability failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EngineError {
    #[snafu(display("engine connection failed: {source}"))]
    Connect { source: ConnectError },

    #[snafu(display("image operation failed: {source}"))]
    Image { source: ImageError },

    #[snafu(display("container operation failed: {source}"))]
    Container { source: ContainerError },

    #[snafu(display("exec operation failed: {source}"))]
    Exec { source: ExecError },

    #[snafu(display("log streaming failed: {source}"))]
    Log { source: LogError },

    #[snafu(display("engine query failed: {source}"))]
    Info { source: EngineInfoError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// The engine daemon could not be reached.
    Unreachable,
    /// A referenced image or container does not exist.
    NotFound,
    /// Any other engine-side operation failure.
    Operation,
}

impl EngineError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> EngineErrorKind {
        match self {
            EngineError::Connect { .. } => EngineErrorKind::Unreachable,
            EngineError::Info {
                source: EngineInfoError::ConnectionFailed(_),
            } => EngineErrorKind::Unreachable,
            EngineError::Image {
                source: ImageError::NotFound(_),
            } => EngineErrorKind::NotFound,
            EngineError::Container {
                source: ContainerError::NotFound(_) | ContainerError::ImageNotFound(_),
            } => EngineErrorKind::NotFound,
            EngineError::Exec {
                source: ExecError::ContainerNotFound(_),
            } => EngineErrorKind::NotFound,
            EngineError::Log {
                source: LogError::ContainerNotFound(_),
            } => EngineErrorKind::NotFound,
            _ => EngineErrorKind::Operation,
        }
    }
}

impl From<ConnectError> for EngineError {
    fn from(source: ConnectError) -> Self {
        EngineError::Connect { source }
    }
}

impl From<ImageError> for EngineError {
    fn from(source: ImageError) -> Self {
        EngineError::Image { source }
    }
}

impl From<ContainerError> for EngineError {
    fn from(source: ContainerError) -> Self {
        EngineError::Container { source }
    }
}

impl From<ExecError> for EngineError {
    fn from(source: ExecError) -> Self {
        EngineError::Exec { source }
    }
}

impl From<LogError> for EngineError {
    fn from(source: LogError) -> Self {
        EngineError::Log { source }
    }
}

impl From<EngineInfoError> for EngineError {
    fn from(source: EngineInfoError) -> Self {
        EngineError::Info { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_kinds() {
        let err: EngineError = ImageError::NotFound("x".to_string()).into();
        assert_eq!(err.kind(), EngineErrorKind::NotFound);

        let err: EngineError = ContainerError::Engine("boom".to_string()).into();
        assert_eq!(err.kind(), EngineErrorKind::Operation);
    }

    #[test]
    fn connect_kind_is_unreachable() {
        let err: EngineError = ConnectError::EngineUnreachable {
            endpoint: "/var/run/docker.sock".to_string(),
            reason: "refused".to_string(),
        }
        .into();
        assert_eq!(err.kind(), EngineErrorKind::Unreachable);
    }
}
