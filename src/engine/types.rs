// ABOUTME: Engine type definitions for Docker and Podman.
// ABOUTME: Includes EngineKind enum and resolved endpoint info.

use serde::{Deserialize, Serialize};

/// The container engine backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Docker,
    Podman,
}

impl Default for EngineKind {
    fn default() -> Self {
        EngineKind::Docker
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Docker => write!(f, "docker"),
            EngineKind::Podman => write!(f, "podman"),
        }
    }
}

/// A resolved engine connection endpoint.
#[derive(Debug, Clone)]
pub struct EngineEndpoint {
    pub kind: EngineKind,
    /// Path to the engine's Unix socket.
    pub socket_path: String,
}
