// ABOUTME: Container engine abstraction for Docker and Podman.
// ABOUTME: One capability surface, two backends behind a connection factory.

mod bollard;
mod connect;
mod error;
pub mod traits;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use bollard::BollardEngine;
pub use connect::{ConnectError, DOCKER_SOCKET, connect_engine, resolve_endpoint};
pub use error::{EngineError, EngineErrorKind};
pub use traits::Engine;
pub use types::{EngineEndpoint, EngineKind};
