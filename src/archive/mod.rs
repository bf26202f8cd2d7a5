//! Compression of rotated log files
//!
//! An [`Archiver`] turns a freshly rotated copy into its compressed form and
//! removes the uncompressed file once the compressed one is complete. The
//! strategy is picked from configuration through [`ArchiveKind`], which is the
//! single definition shared by config deserialization and the rotation core.
//!
//! | kind   | strategy                      | default extension |
//! |--------|-------------------------------|-------------------|
//! | `gzip` | in-process [`GzipArchiver`]   | `.gz`             |
//! | `bz2`  | `tar cjf` via [`TarArchiver`] | `.tar.bz2`        |
//! | `xz`   | `tar cJf` via [`TarArchiver`] | `.tar.xz`         |
//! | `none` | no archiving                  |                   |

mod gzip;
mod tar;

pub use gzip::GzipArchiver;
pub use tar::{TarArchiver, TarCodec};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove uncompressed {path}: {source}")]
    RemoveSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}")]
    ToolFailed {
        tool: &'static str,
        status: std::process::ExitStatus,
    },

    #[error("archive task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0} has no file name")]
    InvalidPath(PathBuf),
}

/// Compression strategy applied to a rotated file.
///
/// On success `rotated` no longer exists and `archived` holds the compressed
/// content. On failure the rotated copy may still be on disk.
#[async_trait]
pub trait Archiver: Send + Sync + fmt::Debug {
    async fn archive(&self, rotated: &Path, archived: &Path) -> Result<(), ArchiveError>;
}

/// Archive format selected per project.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    Gzip,
    Bz2,
    Xz,
    #[default]
    None,
}

#[derive(Debug, Error)]
#[error("unknown archive type '{0}', expected one of gzip, bz2, xz, none")]
pub struct UnknownArchiveKind(pub String);

impl ArchiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveKind::Gzip => "gzip",
            ArchiveKind::Bz2 => "bz2",
            ArchiveKind::Xz => "xz",
            ArchiveKind::None => "none",
        }
    }

    /// Extension appended to the rotated path when the project leaves `ext` empty.
    pub fn default_extension(&self) -> &'static str {
        match self {
            ArchiveKind::Gzip => ".gz",
            ArchiveKind::Bz2 => ".tar.bz2",
            ArchiveKind::Xz => ".tar.xz",
            ArchiveKind::None => "",
        }
    }

    /// Strategy for this kind; `None` means rotated copies stay uncompressed.
    pub fn archiver(&self) -> Option<Arc<dyn Archiver>> {
        match self {
            ArchiveKind::Gzip => Some(Arc::new(GzipArchiver::default())),
            ArchiveKind::Bz2 => Some(Arc::new(TarArchiver::new(TarCodec::Bzip2))),
            ArchiveKind::Xz => Some(Arc::new(TarArchiver::new(TarCodec::Xz))),
            ArchiveKind::None => None,
        }
    }
}

impl FromStr for ArchiveKind {
    type Err = UnknownArchiveKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gzip" => Ok(ArchiveKind::Gzip),
            "bz2" => Ok(ArchiveKind::Bz2),
            "xz" => Ok(ArchiveKind::Xz),
            "none" => Ok(ArchiveKind::None),
            other => Err(UnknownArchiveKind(other.to_string())),
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
