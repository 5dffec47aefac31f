//! `carts.toml` configuration.
//!
//! Every field has a default, so a missing file or a partial one is fine.
//! Relative paths resolve against the project root.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cart_core::DEMO_TOKEN_VALUE;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

pub const CONFIG_FILE: &str = "carts.toml";

/// Environment override for the project root.
pub const ROOT_ENV: &str = "CARTS_ROOT";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub memory: PathBuf,
    pub activity_log: PathBuf,
    pub tokens: PathBuf,
    pub ledger: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            memory: PathBuf::from("brain.py"),
            activity_log: PathBuf::from("mongoose/activity_log.json"),
            tokens: PathBuf::from("token"),
            ledger: PathBuf::from("ledger"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub token_hash: String,
    pub token_value: f64,
    /// Generate demo gestures in the location cart instead of standing by.
    pub location_demo: bool,
    /// Cart names to treat as unavailable.
    pub disabled: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            token_hash: format!("demo{}", "0".repeat(60)),
            token_value: DEMO_TOKEN_VALUE,
            location_demo: true,
            disabled: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    pub paths: PathsConfig,
    pub run: RunConfig,
}

/// Config paths joined onto a root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub memory: PathBuf,
    pub activity_log: PathBuf,
    pub tokens: PathBuf,
    pub ledger: PathBuf,
}

impl CartConfig {
    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(StoreError::InvalidData(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn resolve(&self, root: &Path) -> ResolvedPaths {
        ResolvedPaths {
            memory: root.join(&self.paths.memory),
            activity_log: root.join(&self.paths.activity_log),
            tokens: root.join(&self.paths.tokens),
            ledger: root.join(&self.paths.ledger),
        }
    }

    pub fn is_disabled(&self, cart: &str) -> bool {
        self.run.disabled.iter().any(|d| d == cart)
    }
}

/// Resolve the project root.
///
/// Priority chain:
/// 1. Explicit `--root`
/// 2. `CARTS_ROOT` environment variable
/// 3. Current directory
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(root) = explicit {
        return root.to_path_buf();
    }
    env::var(ROOT_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
