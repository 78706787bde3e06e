//! Configuration module for classgraph.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CLASSGRAPH_` and use double
//! underscores to separate nested levels:
//! - `CLASSGRAPH_RESOLVER__ALLOW_UNRESOLVED=true` sets `resolver.allow_unresolved`
//! - `CLASSGRAPH_RESOLVER__ROOT_TYPE=Any` sets `resolver.root_type`
//! - `CLASSGRAPH_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::io::OutputFormat;

/// Directory holding the workspace configuration.
pub const CONFIG_DIR: &str = ".classgraph";
const CONFIG_FILE: &str = "settings.toml";
const ENV_PREFIX: &str = "CLASSGRAPH_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Raise the default log level to `debug` unless `RUST_LOG` is set
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Reference resolution and sentinel types
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Log levels
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Report rendering
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Name of the root class every class implicitly extends
    #[serde(default = "default_root_type")]
    pub root_type: String,

    /// Other spellings that refer to the root class
    #[serde(default = "default_root_aliases")]
    pub root_aliases: Vec<String>,

    /// Well-known types outside the closed world, resolved as opaque sentinels
    #[serde(default = "default_builtin_types")]
    pub builtin_types: Vec<String>,

    /// Qualified-name prefixes treated as external library types
    #[serde(default = "default_external_prefixes")]
    pub external_prefixes: Vec<String>,

    /// Resolve unknown names as external sentinels instead of failing the build
    #[serde(default = "default_false")]
    pub allow_unresolved: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for every module
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-stage or per-module overrides, e.g. `builder = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    /// Default report format for `check` and `query`
    #[serde(default)]
    pub format: OutputFormat,

    /// Include types without findings in text reports
    #[serde(default = "default_true")]
    pub show_clean_types: bool,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_root_type() -> String {
    "Object".to_string()
}
fn default_root_aliases() -> Vec<String> {
    vec!["java.lang.Object".to_string()]
}
fn default_builtin_types() -> Vec<String> {
    [
        "Serializable",
        "Cloneable",
        "Comparable",
        "Runnable",
        "AutoCloseable",
        "Closeable",
        "Iterable",
        "CharSequence",
        "Throwable",
        "Exception",
        "RuntimeException",
        "Error",
        "Enum",
        "Record",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_external_prefixes() -> Vec<String> {
    vec!["java.".to_string(), "javax.".to_string()]
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            resolver: ResolverConfig::default(),
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            root_type: default_root_type(),
            root_aliases: default_root_aliases(),
            builtin_types: default_builtin_types(),
            external_prefixes: default_external_prefixes(),
            allow_unresolved: false,
        }
    }
}

impl ResolverConfig {
    /// A closed world with no external sentinels besides the root.
    pub fn closed() -> Self {
        Self {
            builtin_types: Vec::new(),
            external_prefixes: Vec::new(),
            ..Self::default()
        }
    }

    pub fn is_root(&self, name: &str) -> bool {
        self.root_type == name || self.root_aliases.iter().any(|alias| alias == name)
    }

    /// Whether `name` refers to a known type outside the declaration set.
    pub fn is_external(&self, name: &str) -> bool {
        self.builtin_types.iter().any(|builtin| builtin == name)
            || self
                .external_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            show_clean_types: true,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref().to_path_buf())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: PathBuf) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels, single underscore stays in field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
    }

    /// Find the workspace config by looking for the config directory
    /// Searches from current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join(CONFIG_FILE));
            }
        }

        None
    }

    /// Write these settings as TOML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string).map_err(io_error)
    }

    /// Write default settings to `<dir>/.classgraph/settings.toml`.
    ///
    /// Refuses to replace an existing file unless `force` is set.
    pub fn init_config_file(dir: &Path, force: bool) -> Result<PathBuf, ConfigError> {
        let config_path = dir.join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err(ConfigError::AlreadyExists(config_path));
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}

/// Failures writing configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file already exists at {}. Use --force to overwrite", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
