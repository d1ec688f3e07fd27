// ABOUTME: Distro driver layer: package-manager capabilities atop the handler.
// ABOUTME: Drivers compose a Handler and a RepoRef rather than inheriting.

mod rpm;

pub use rpm::{RpmDriver, parse_builddep_output, parse_repoquery_output, recipe_path};

use crate::handler::HandlerError;
use thiserror::Error;

/// Why dependency resolution failed.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("resolver exited with code {0}")]
    Failed(i64),

    #[error("resolver output missing the Installing:/Transaction Summary block")]
    MissingMarkers,
}

/// Errors from distro driver operations.
#[derive(Debug, Error)]
pub enum DistroError {
    #[error("dependency resolution failed: {0}")]
    DependencyResolution(ResolutionError),

    #[error("nothing to install: provide a package name or a recipe file")]
    MissingInstallTarget,

    #[error("multiple repository images match project {0}; pass an explicit repository name")]
    AmbiguousRepository(String),

    #[error("no repository image found for project {0}")]
    NoRepository(String),

    #[error(transparent)]
    Handler(#[from] HandlerError),
}
