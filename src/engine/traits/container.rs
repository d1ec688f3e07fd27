// ABOUTME: Container operations trait for container engines.
// ABOUTME: Create, start, stop, remove, wait, and commit containers.

use super::sealed::Sealed;
use crate::types::{ContainerId, ImageId, RepoRef};
use async_trait::async_trait;
use std::time::Duration;

/// Container lifecycle operations.
#[async_trait]
pub trait ContainerOps: Sealed + Send + Sync {
    /// Create a detached container from the given configuration.
    async fn create_container(&self, config: &ContainerConfig)
    -> Result<ContainerId, ContainerError>;

    /// Start a created container.
    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError>;

    /// Stop a running container.
    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Duration,
    ) -> Result<(), ContainerError>;

    /// Remove a container.
    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError>;

    /// Current lifecycle state of a container.
    async fn container_state(&self, id: &ContainerId) -> Result<ContainerState, ContainerError>;

    /// Resolve an existing container by name.
    async fn find_container(&self, name: &str) -> Result<ContainerId, ContainerError>;

    /// Block until the container exits and return its exit code.
    async fn wait_container(&self, id: &ContainerId) -> Result<i64, ContainerError>;

    /// Commit the container's filesystem delta as a new image under `repo:tag`.
    async fn commit_container(
        &self,
        id: &ContainerId,
        reference: &RepoRef,
    ) -> Result<ImageId, ContainerError>;
}

/// Configuration for creating a container.
#[derive(Debug, Clone, Default)]
pub struct ContainerConfig {
    /// Optional container name; the engine assigns one when absent.
    pub name: Option<String>,
    /// Image reference (`repo:tag`) or id to create from.
    pub image: String,
    /// Command to run; the image default applies when absent.
    pub command: Option<Vec<String>>,
}

/// Container lifecycle state as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
}

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container already exists: {0}")]
    AlreadyExists(String),

    #[error("container not running: {0}")]
    NotRunning(String),

    #[error("container already running: {0}")]
    AlreadyRunning(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("commit failed: {0}")]
    CommitFailed(String),

    #[error("engine error: {0}")]
    Engine(String),
}
