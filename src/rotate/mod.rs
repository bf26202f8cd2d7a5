//! Copy-truncate rotation of a single log file
//!
//! A [`RotationJob`] is built once per configured project and runs the whole
//! pipeline for that file:
//!
//! 1. inspect the live log into a [`LogInfo`] snapshot
//! 2. evaluate its [`RotationRule`]
//! 3. copy the contents to the rendered destination and truncate the source
//!    in place, so writers holding the file open keep the same inode
//! 4. signal the owning process to reopen its log
//! 5. compress the copy with the configured archiver
//! 6. evict copies beyond the retention count
//!
//! Every invocation produces exactly one [`RotationResult`].

mod condition;
mod error;
pub mod eviction;
mod job;
mod notify;
mod template;

pub use condition::RotationRule;
pub use error::{EvictionError, InspectError, JobError, RotateError};
pub use eviction::{EvictionReport, RotatedFile};
pub use job::{RotationJob, RotationOutcome};
pub use notify::{Callback, signal_reload};
pub use template::{DestinationTemplate, TemplateError};

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// State of a log file at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub last_changed_at: SystemTime,
}

impl LogInfo {
    /// Snapshot used when the file could not be inspected.
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            size_bytes: 0,
            last_changed_at: SystemTime::UNIX_EPOCH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RotationStatus {
    Success,
    Fail,
    Skip,
}

impl fmt::Display for RotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RotationStatus::Success => "SUCCESS",
            RotationStatus::Fail => "FAIL",
            RotationStatus::Skip => "SKIP",
        })
    }
}

/// Outcome of one job for one run. An error is present exactly when the status is FAIL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationResult {
    name: String,
    status: RotationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RotationResult {
    pub fn success(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: RotationStatus::Success,
            error: None,
        }
    }

    pub fn skip(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: RotationStatus::Skip,
            error: None,
        }
    }

    pub fn fail(name: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            status: RotationStatus::Fail,
            error: Some(error.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> RotationStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl fmt::Display for RotationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.status)?;
        if let Some(error) = &self.error {
            write!(f, " ({error})")?;
        }
        Ok(())
    }
}
