// ABOUTME: Configuration types and parsing for burrow.yml.
// ABOUTME: Handles YAML parsing and user/system file discovery.

use crate::engine::EngineKind;
use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "burrow.yml";
pub const USER_CONFIG_DIR: &str = ".config/burrow";
pub const SYSTEM_CONFIG_DIR: &str = "/etc/burrow";

/// Optional settings layered under the CLI flags.
///
/// Every field has a working default, so a missing config file is not an
/// error: `Config::discover` falls back to `Config::default()`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Which engine to talk to. CLI `--podman` overrides this.
    #[serde(default)]
    pub engine: Option<EngineKind>,

    /// Explicit engine socket path, overriding endpoint resolution.
    #[serde(default)]
    pub socket: Option<String>,

    /// Project name used to scope image inventory. Defaults to the
    /// repository name when unset.
    #[serde(default)]
    pub project: Option<String>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first config file found, user file before system file.
    /// No file at all yields the defaults.
    pub fn discover() -> Result<Self> {
        Self::discover_in(&Self::candidates())
    }

    fn discover_in(candidates: &[PathBuf]) -> Result<Self> {
        for path in candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::load(path);
            }
        }
        Ok(Self::default())
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(USER_CONFIG_DIR)
                    .join(CONFIG_FILENAME),
            );
        }
        paths.push(PathBuf::from(SYSTEM_CONFIG_DIR).join(CONFIG_FILENAME));
        paths
    }
}
