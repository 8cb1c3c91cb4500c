//! Configuration management for the batchfs engine
//!
//! Supports YAML and TOML configuration files with environment variable
//! overrides and sensible defaults for every option.
//!
//! # Examples
//!
//! ```rust
//! use batchfs_config::{Config, ConfigBuilder};
//!
//! let config = ConfigBuilder::new()
//!     .add_source_file("batchfs.yaml")
//!     .add_env_prefix("BATCHFS")
//!     .build()
//!     .expect("failed to load configuration");
//!
//! println!("conflict policy: {:?}", config.operation.conflict_policy);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

use batchfs_types::{ConflictPolicy, ProgressWeighting};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Main configuration structure for batchfs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Operation behaviour configuration
    pub operation: OperationConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Operation behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationConfig {
    /// Policy applied when a destination path already exists
    pub conflict_policy: ConflictPolicy,
    /// What drives progress accounting
    pub progress_weighting: ProgressWeighting,
    /// Preserve source modification times on copied files
    pub preserve_mtime: bool,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::default(),
            progress_weighting: ProgressWeighting::default(),
            preserve_mtime: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable file logging
    pub enable_file_logging: bool,
    /// Log file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_file_logging: false,
            log_file: None,
        }
    }
}
