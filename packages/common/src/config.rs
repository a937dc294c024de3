use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "quire.config.json";

/// Hard ceiling on blank rows a single grid write may create implicitly
pub const DEFAULT_IMPLICIT_APPEND_LIMIT: usize = 100;

/// Editing session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuireConfig {
    /// Maximum blank rows a grid write may append ahead of its target row
    #[serde(default = "default_implicit_append_limit")]
    pub implicit_append_limit: usize,

    /// Frozen header rows assumed when a table is opened without an explicit count
    #[serde(default = "default_frozen_rows")]
    pub default_frozen_rows: usize,

    /// Treat a table whose derived size disagrees with its element size as malformed
    #[serde(default)]
    pub strict_table_sizes: bool,
}

fn default_implicit_append_limit() -> usize {
    DEFAULT_IMPLICIT_APPEND_LIMIT
}

fn default_frozen_rows() -> usize {
    1
}

impl QuireConfig {
    /// Load config from a directory, falling back to defaults when absent
    pub fn load(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_path = Self::path_in(dir);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: QuireConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(QuireConfig::default())
        }
    }

    pub fn path_in(dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(DEFAULT_CONFIG_NAME)
    }
}

impl Default for QuireConfig {
    fn default() -> Self {
        Self {
            implicit_append_limit: default_implicit_append_limit(),
            default_frozen_rows: default_frozen_rows(),
            strict_table_sizes: false,
        }
    }
}
