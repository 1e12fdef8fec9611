//! Configuration types and structures.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Tree used when a project has none assigned.
pub const DEFAULT_TREE_NAME: &str = "default";

/// Errors raised while reading a single configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trees: TreesConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from a single YAML file, without tier merging.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        // Empty or comment-only files parse as null
        let config: Option<Config> =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config.unwrap_or_default())
    }
}

/// Where tree documents are found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreesConfig {
    /// Folder holding `<name>.json` tree documents. When unset, trees are
    /// looked up under `trees/` in the config tiers, then in the embedded set.
    #[serde(default)]
    pub folder: Option<PathBuf>,

    /// Tree assigned to projects that have none (default: "default").
    #[serde(default = "default_tree_name")]
    pub default_tree: String,
}

impl Default for TreesConfig {
    fn default() -> Self {
        Self {
            folder: None,
            default_tree: default_tree_name(),
        }
    }
}

fn default_tree_name() -> String {
    DEFAULT_TREE_NAME.to_string()
}

/// Rendering policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Fail on placeholders that cannot be resolved instead of leaving them in place.
    #[serde(default)]
    pub strict_tokens: bool,

    /// Software used for `<Software>` when the caller gives none.
    #[serde(default)]
    pub default_software: SoftwareDefault,

    /// Output type name used for `<OutputType>` when the caller gives none.
    #[serde(default = "default_output_type")]
    pub default_output_type: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            strict_tokens: false,
            default_software: SoftwareDefault::default(),
            default_output_type: default_output_type(),
        }
    }
}

fn default_output_type() -> String {
    "Geometry".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftwareDefault {
    #[serde(default = "default_software_name")]
    pub name: String,
    #[serde(default = "default_software_short_name")]
    pub short_name: String,
    #[serde(default = "default_software_extension")]
    pub file_extension: String,
}

impl Default for SoftwareDefault {
    fn default() -> Self {
        Self {
            name: default_software_name(),
            short_name: default_software_short_name(),
            file_extension: default_software_extension(),
        }
    }
}

fn default_software_name() -> String {
    "3dsmax".to_string()
}

fn default_software_short_name() -> String {
    "max".to_string()
}

fn default_software_extension() -> String {
    ".max".to_string()
}

/// Entity database used by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("file-tree.db")
}
