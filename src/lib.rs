// ABOUTME: Library root for burrow - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod distro;
pub mod engine;
pub mod error;
pub mod handler;
pub mod output;
pub mod process;
pub mod types;
