// ABOUTME: Composable capability traits for container engines.
// ABOUTME: Defines ImageOps, ContainerOps, ExecOps, LogOps, EngineInfo.

mod container;
mod exec;
mod image;
mod info;
mod logs;
pub(crate) mod sealed;

pub use container::{ContainerConfig, ContainerError, ContainerOps, ContainerState};
pub use exec::{ExecError, ExecOps, ExecResult};
pub use image::{ImageError, ImageOps, ImageSummary};
pub use info::{EngineInfo, EngineInfoError};
pub use logs::{LogError, LogLine, LogOps, LogOptions, LogStream};

/// The full capability surface a handler needs from a container engine.
///
/// Blanket-implemented for any type providing every capability trait, so
/// callers can bound on one name instead of five.
pub trait Engine: ImageOps + ContainerOps + ExecOps + LogOps + EngineInfo {}

impl<T> Engine for T where T: ImageOps + ContainerOps + ExecOps + LogOps + EngineInfo {}
