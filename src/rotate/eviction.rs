//! Retention of rotated copies
//!
//! After a rotation, the copies left by earlier runs are listed by globbing
//! the destination template, ordered newest first by modification time, and
//! everything past the retention count is deleted. A file that cannot be
//! removed is reported and skipped; the sweep carries on with the rest.

use std::path::PathBuf;
use std::time::SystemTime;
use tracing::{debug, info, warn};

use super::error::EvictionError;
use super::template::DestinationTemplate;

/// A rotated copy found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatedFile {
    pub path: PathBuf,
    pub last_changed_at: SystemTime,
}

/// Eviction statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EvictionReport {
    pub matched: usize,
    pub removed: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Every existing rendering of `template` followed by `suffix`, newest first.
pub fn rotated_files(
    template: &DestinationTemplate,
    suffix: &str,
) -> Result<Vec<RotatedFile>, EvictionError> {
    let pattern = template.glob_pattern(suffix);
    let entries = glob::glob(&pattern).map_err(|source| EvictionError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "unreadable entry while listing rotated files");
                continue;
            }
        };
        let Some(name) = path.to_str() else {
            continue;
        };
        if !template.matches(name, suffix) {
            continue;
        }
        match std::fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(last_changed_at) => files.push(RotatedFile {
                path,
                last_changed_at,
            }),
            Err(e) => warn!(path = %path.display(), error = %e, "cannot stat rotated file"),
        }
    }

    // Newest first; equal timestamps fall back to the rendered name, which sorts by time too.
    files.sort_by(|a, b| {
        b.last_changed_at
            .cmp(&a.last_changed_at)
            .then_with(|| b.path.cmp(&a.path))
    });
    Ok(files)
}

/// Keep the `retention` most recently changed copies and delete the rest.
pub fn evict(
    template: &DestinationTemplate,
    suffix: &str,
    retention: usize,
) -> Result<EvictionReport, EvictionError> {
    let files = rotated_files(template, suffix)?;
    let mut report = EvictionReport {
        matched: files.len(),
        ..Default::default()
    };

    debug!(
        pattern = %template.glob_pattern(suffix),
        existing = files.len(),
        retention,
        "evaluating rotated files"
    );

    for stale in files.into_iter().skip(retention) {
        match std::fs::remove_file(&stale.path) {
            Ok(()) => {
                info!(
                    file = %stale.path.display(),
                    existing = report.matched,
                    retention,
                    "old rotated file deleted"
                );
                report.removed.push(stale.path);
            }
            Err(e) => {
                warn!(file = %stale.path.display(), error = %e, "failed to delete old rotated file");
                report.failed.push(stale.path);
            }
        }
    }

    Ok(report)
}

/// [`evict`] on the blocking pool, for callers running on the async runtime.
pub async fn sweep(
    template: &DestinationTemplate,
    suffix: &str,
    retention: usize,
) -> Result<EvictionReport, EvictionError> {
    let template = template.clone();
    let suffix = suffix.to_string();
    tokio::task::spawn_blocking(move || evict(&template, &suffix, retention)).await?
}
