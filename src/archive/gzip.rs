use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{ArchiveError, Archiver};

/// In-process gzip compression at the highest level.
#[derive(Debug, Clone, Copy)]
pub struct GzipArchiver {
    level: Compression,
}

impl Default for GzipArchiver {
    fn default() -> Self {
        Self {
            level: Compression::best(),
        }
    }
}

#[async_trait]
impl Archiver for GzipArchiver {
    async fn archive(&self, rotated: &Path, archived: &Path) -> Result<(), ArchiveError> {
        let rotated = rotated.to_path_buf();
        let archived = archived.to_path_buf();
        let level = self.level;
        tokio::task::spawn_blocking(move || compress(&rotated, &archived, level)).await?
    }
}

fn compress(rotated: &Path, archived: &Path, level: Compression) -> Result<(), ArchiveError> {
    let read_err = |source| ArchiveError::Read {
        path: rotated.to_path_buf(),
        source,
    };
    let write_err = |source| ArchiveError::Write {
        path: archived.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(rotated).map_err(read_err)?;
    let contents = fs::read(rotated).map_err(read_err)?;

    // Appending keeps an earlier archive of the same name readable as a multi-member gzip.
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(metadata.permissions().mode());
    }
    #[cfg(not(unix))]
    let _ = &metadata;

    let file = options.open(archived).map_err(write_err)?;
    let mut encoder = GzEncoder::new(file, level);
    encoder.write_all(&contents).map_err(write_err)?;
    encoder.finish().map_err(write_err)?.sync_all().map_err(write_err)?;

    fs::remove_file(rotated).map_err(|source| ArchiveError::RemoveSource {
        path: PathBuf::from(rotated),
        source,
    })?;

    debug!(
        from = %rotated.display(),
        to = %archived.display(),
        bytes = contents.len(),
        "gzip archive written"
    );
    Ok(())
}
