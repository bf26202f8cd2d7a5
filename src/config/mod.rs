//! Configuration management for newsyslog
//!
//! Settings are loaded from:
//! 1. Default values (embedded in structs)
//! 2. The root TOML configuration file
//! 3. Environment variables (highest priority)
//! 4. Files matched by `common.include`, merged in recursively
//!
//! # Usage
//!
//! ```no_run
//! use newsyslog::config::Config;
//!
//! let config = Config::load_from_path("/etc/newsyslog.toml").expect("Failed to load configuration");
//! println!("{} projects configured", config.projects.len());
//! ```
//!
//! # Environment Variables
//!
//! Overrides follow the pattern `NEWSYSLOG__<section>__<key>`, e.g.
//! `NEWSYSLOG__COMMON__INCLUDE=/etc/newsyslog.d/*.toml`.
//!
//! # Configuration File
//!
//! The root file comes from the command line, else `NEWSYSLOG_CONFIG`, else
//! `/etc/newsyslog.toml`.

mod models;
mod resolver;
mod sources;
mod validation;

// Re-export public types
pub use models::{CommonConfig, CompressConfig, Config, ProjectConfig, RotateConfig};
pub use resolver::{IncludeError, IncludeResolver, Resolved};
pub use sources::default_path;
pub use validation::ValidationError;

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load the root file plus environment overrides, without includes.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path.as_ref())?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load the root file and every file it includes into one project list.
    ///
    /// Only the root file can make this fail. Include sources that fail to
    /// load, or that reuse a project name or log file already merged, are
    /// logged and skipped.
    pub fn load_with_includes(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let root = Self::load_from_path(path)?;
        let common = root.common.clone();

        let resolved = IncludeResolver::new().resolve(root, path);
        if !resolved.skipped.is_empty() {
            tracing::warn!(
                skipped = resolved.skipped.len(),
                "some include sources were skipped"
            );
        }

        Ok(Config {
            common,
            projects: resolved.projects,
        })
    }
}
