// ABOUTME: Sealed trait pattern for engine capability traits.
// ABOUTME: Prevents external implementations, allowing non-breaking evolution.

/// Sealed trait to prevent external implementations.
///
/// Only types that implement Sealed (our internal engine types) can implement
/// the capability traits, so methods can be added without breaking semver.
pub trait Sealed {}
