// ABOUTME: Image operations trait for container engines.
// ABOUTME: Inspect, pull, tag, remove, and list images.

use super::sealed::Sealed;
use crate::types::{ImageId, RepoRef};
use async_trait::async_trait;

/// Image operations: resolve, pull, tag, remove, list.
#[async_trait]
pub trait ImageOps: Sealed + Send + Sync {
    /// Resolve an existing local image by `name:tag` reference or id.
    async fn inspect_image(&self, reference: &str) -> Result<ImageId, ImageError>;

    /// Pull an image from the upstream registry and return its local id.
    async fn pull_image(&self, reference: &RepoRef) -> Result<ImageId, ImageError>;

    /// Apply a `repo:tag` alias to an existing image.
    async fn tag_image(&self, image: &ImageId, reference: &RepoRef) -> Result<(), ImageError>;

    /// Remove an image.
    async fn remove_image(&self, image: &ImageId, force: bool) -> Result<(), ImageError>;

    /// List all local images (including untagged ones).
    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError>;
}

/// Summary information about a local image.
#[derive(Debug, Clone)]
pub struct ImageSummary {
    pub id: ImageId,
    /// `repo:tag` aliases pointing at this image.
    pub tags: Vec<String>,
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("image in use, cannot remove: {0}")]
    InUse(String),

    #[error("engine error: {0}")]
    Engine(String),
}
