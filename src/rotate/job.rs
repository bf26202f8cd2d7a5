use chrono::Local;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use super::condition::RotationRule;
use super::error::{InspectError, RotateError};
use super::eviction::{self, EvictionReport};
use super::notify::{self, Callback};
use super::template::DestinationTemplate;
use super::{LogInfo, RotationResult};
use crate::archive::Archiver;

/// Rotation pipeline for one log file.
///
/// Immutable once built; each call recomputes its state from the filesystem.
#[derive(Debug, bon::Builder)]
pub struct RotationJob {
    #[builder(into)]
    name: String,
    /// Live log file.
    #[builder(into)]
    source: PathBuf,
    destination: DestinationTemplate,
    /// Appended to the rotated path when an archiver is set.
    #[builder(into, default)]
    archive_ext: String,
    archiver: Option<Arc<dyn Archiver>>,
    #[builder(default = RotationRule::Always)]
    rule: RotationRule,
    /// Number of rotated copies kept after eviction.
    #[builder(default)]
    retention: usize,
    #[builder(into)]
    pid_file: Option<PathBuf>,
    #[builder(default)]
    on_success: Callback,
    #[builder(default)]
    on_failure: Callback,
}

/// What a successful rotation left on disk.
#[derive(Debug, Clone)]
pub struct RotationOutcome {
    pub rotated: PathBuf,
    pub archived: Option<PathBuf>,
    pub signalled_pid: Option<i32>,
    pub eviction: EvictionReport,
}

impl RotationJob {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn rule(&self) -> &RotationRule {
        &self.rule
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub async fn inspect(&self) -> Result<LogInfo, InspectError> {
        let stat_err = |source| InspectError::Stat {
            path: self.source.clone(),
            source,
        };
        let metadata = tokio::fs::metadata(&self.source).await.map_err(stat_err)?;
        let last_changed_at = metadata.modified().map_err(stat_err)?;

        Ok(LogInfo {
            path: self.source.clone(),
            size_bytes: metadata.len(),
            last_changed_at,
        })
    }

    pub fn can_rotate(&self, info: &LogInfo) -> bool {
        self.rule.evaluate(info)
    }

    /// Inspect, decide, and rotate when due.
    pub async fn run(&self) -> RotationResult {
        let info = self.snapshot().await;
        if !self.can_rotate(&info) {
            info!(job = %self.name, rule = %self.rule, size = info.size_bytes, "rotation not due");
            return RotationResult::skip(&self.name);
        }

        match self.rotate().await {
            Ok(outcome) => {
                info!(
                    job = %self.name,
                    rotated = %outcome.rotated.display(),
                    archived = ?outcome.archived,
                    evicted = outcome.eviction.removed.len(),
                    "log rotated"
                );
                self.on_success.fire();
                RotationResult::success(&self.name)
            }
            Err(e) => {
                error!(job = %self.name, error = %e, "rotation failed");
                self.on_failure.fire();
                RotationResult::fail(&self.name, e)
            }
        }
    }

    /// Dry run: report whether [`run`](Self::run) would rotate, touching nothing.
    pub async fn test(&self) -> RotationResult {
        let info = self.snapshot().await;
        if self.can_rotate(&info) {
            info!(job = %self.name, rule = %self.rule, size = info.size_bytes, "rotation due");
            RotationResult::success(&self.name)
        } else {
            info!(job = %self.name, rule = %self.rule, size = info.size_bytes, "rotation not due");
            RotationResult::skip(&self.name)
        }
    }

    /// Copy, truncate, signal, archive and evict, stopping at the first failing step.
    pub async fn rotate(&self) -> Result<RotationOutcome, RotateError> {
        let read_err = |source| RotateError::ReadSource {
            path: self.source.clone(),
            source,
        };
        let metadata = tokio::fs::metadata(&self.source).await.map_err(read_err)?;
        let contents = tokio::fs::read(&self.source).await.map_err(read_err)?;

        let rotated = self.destination.render(&Local::now())?;
        self.write_copy(&rotated, &contents, metadata.permissions())
            .await?;
        debug!(job = %self.name, to = %rotated.display(), bytes = contents.len(), "log copied");

        self.truncate_source().await?;

        let signalled_pid = match &self.pid_file {
            Some(pid_file) => Some(notify::signal_reload(pid_file).await?),
            None => None,
        };

        let archived = match &self.archiver {
            Some(archiver) => {
                let archived = self.archived_path(&rotated);
                archiver.archive(&rotated, &archived).await?;
                debug!(job = %self.name, from = %rotated.display(), to = %archived.display(), "compress succeeded");
                Some(archived)
            }
            None => None,
        };

        let eviction =
            eviction::sweep(&self.destination, self.eviction_suffix(), self.retention).await?;
        if !eviction.failed.is_empty() {
            warn!(
                job = %self.name,
                failed = eviction.failed.len(),
                "some rotated files could not be evicted"
            );
        }

        Ok(RotationOutcome {
            rotated,
            archived,
            signalled_pid,
            eviction,
        })
    }

    async fn snapshot(&self) -> LogInfo {
        match self.inspect().await {
            Ok(info) => {
                debug!(job = %self.name, path = %info.path.display(), size = info.size_bytes, "log status");
                info
            }
            Err(e) => {
                warn!(job = %self.name, error = %e, "cannot inspect log, treating it as empty");
                LogInfo::empty(&self.source)
            }
        }
    }

    async fn write_copy(
        &self,
        rotated: &Path,
        contents: &[u8],
        permissions: std::fs::Permissions,
    ) -> Result<(), RotateError> {
        let write_err = |source| RotateError::WriteDestination {
            path: rotated.to_path_buf(),
            source,
        };

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options.mode(permissions.mode());
        }

        let mut file = options.open(rotated).await.map_err(write_err)?;
        file.write_all(contents).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        // The open mode is filtered by umask and ignored for an existing file.
        tokio::fs::set_permissions(rotated, permissions)
            .await
            .map_err(write_err)
    }

    /// Empty the live file in place; the inode and mode stay as they were.
    async fn truncate_source(&self) -> Result<(), RotateError> {
        let truncate_err = |source| RotateError::Truncate {
            path: self.source.clone(),
            source,
        };
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&self.source)
            .await
            .map_err(truncate_err)?;
        file.set_len(0).await.map_err(truncate_err)
    }

    fn archived_path(&self, rotated: &Path) -> PathBuf {
        let mut path = OsString::from(rotated.as_os_str());
        path.push(&self.archive_ext);
        PathBuf::from(path)
    }

    fn eviction_suffix(&self) -> &str {
        if self.archiver.is_some() {
            &self.archive_ext
        } else {
            ""
        }
    }
}
