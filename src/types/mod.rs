// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;
mod repo_ref;

pub use id::{ContainerId, ExecId, ImageId};
pub use repo_ref::RepoRef;
