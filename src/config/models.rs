use crate::archive::ArchiveKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectConfig>,
}

/// Settings shared by the whole file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommonConfig {
    /// Glob of further configuration files whose projects are merged in.
    /// Relative patterns are resolved against the including file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
}

/// One rotated log file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Live log path
    pub from: PathBuf,
    /// Destination template, chrono strftime syntax (e.g. `/var/log/app.log.%Y%m%d`)
    pub to: String,
    #[serde(default)]
    pub rotate: RotateConfig,
    #[serde(default)]
    pub compress: CompressConfig,
    /// Shell command started after a successful rotation
    #[serde(
        default,
        rename = "successCommand",
        alias = "successcommand",
        alias = "success_command"
    )]
    pub success_command: String,
    /// Shell command started after a failed rotation
    #[serde(
        default,
        rename = "failedCommand",
        alias = "failedcommand",
        alias = "failed_command"
    )]
    pub failed_command: String,
    /// File holding the pid to send SIGHUP to after truncation
    #[serde(default)]
    pub pid: Option<PathBuf>,
}

/// Rotation rule; `term` takes precedence over `size`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RotateConfig {
    /// Schedule expression (accepted but never triggers)
    #[serde(default)]
    pub term: String,
    /// Size threshold, e.g. "10MB"
    #[serde(default)]
    pub size: String,
    /// Rotated copies to keep
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompressConfig {
    #[serde(default, rename = "type")]
    pub kind: ArchiveKind,
    /// Extension of the compressed file; defaults per archive type
    #[serde(default)]
    pub ext: String,
}

impl CompressConfig {
    pub fn extension(&self) -> &str {
        if self.ext.is_empty() {
            self.kind.default_extension()
        } else {
            &self.ext
        }
    }
}
