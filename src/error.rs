// ABOUTME: Application-wide error type for burrow.
// ABOUTME: Aggregates the per-layer errors behind one thiserror enum.

use crate::distro::DistroError;
use crate::engine::{ConnectError, EngineError};
use crate::handler::HandlerError;
use crate::process::ProcessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error(transparent)]
    Distro(#[from] DistroError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
