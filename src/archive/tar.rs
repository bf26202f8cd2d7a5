use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use super::{ArchiveError, Archiver};

const TAR: &str = "tar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TarCodec {
    Bzip2,
    Xz,
}

impl TarCodec {
    /// `tar` create flags for this codec.
    fn flags(&self) -> &'static str {
        match self {
            TarCodec::Bzip2 => "cjf",
            TarCodec::Xz => "cJf",
        }
    }
}

/// Delegates compression to the system `tar`.
///
/// The rotated file is added by base name from its parent directory, so the
/// archive holds a single flat entry.
#[derive(Debug, Clone, Copy)]
pub struct TarArchiver {
    codec: TarCodec,
}

impl TarArchiver {
    pub fn new(codec: TarCodec) -> Self {
        Self { codec }
    }
}

#[async_trait]
impl Archiver for TarArchiver {
    async fn archive(&self, rotated: &Path, archived: &Path) -> Result<(), ArchiveError> {
        let name = rotated
            .file_name()
            .ok_or_else(|| ArchiveError::InvalidPath(rotated.to_path_buf()))?;
        let dir = match rotated.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let status = Command::new(TAR)
            .arg(self.codec.flags())
            .arg(archived)
            .arg("-C")
            .arg(dir)
            .arg(name)
            .status()
            .await
            .map_err(|source| ArchiveError::Spawn { tool: TAR, source })?;

        if !status.success() {
            return Err(ArchiveError::ToolFailed { tool: TAR, status });
        }

        tokio::fs::remove_file(rotated)
            .await
            .map_err(|source| ArchiveError::RemoveSource {
                path: rotated.to_path_buf(),
                source,
            })?;

        debug!(
            from = %rotated.display(),
            to = %archived.display(),
            codec = ?self.codec,
            "tar archive written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_codec_flags() {
        assert_eq!(TarCodec::Bzip2.flags(), "cjf");
        assert_eq!(TarCodec::Xz.flags(), "cJf");
    }

    #[tokio::test]
    async fn test_failed_tool_leaves_source_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let rotated = temp_dir.path().join("app.log.1");
        std::fs::write(&rotated, b"payload").unwrap();
        // Destination directory does not exist, so tar cannot create the archive.
        let archived = temp_dir.path().join("missing-dir").join("app.log.1.tar.xz");

        let result = TarArchiver::new(TarCodec::Xz).archive(&rotated, &archived).await;

        assert!(matches!(
            result,
            Err(ArchiveError::ToolFailed { .. }) | Err(ArchiveError::Spawn { .. })
        ));
        assert!(rotated.exists());
    }

    async fn archive_and_list(codec: TarCodec, ext: &str) {
        let temp_dir = TempDir::new().unwrap();
        let rotated = temp_dir.path().join("app.log.20240101");
        std::fs::write(&rotated, b"payload\n").unwrap();
        let archived = temp_dir.path().join(format!("app.log.20240101{ext}"));

        TarArchiver::new(codec)
            .archive(&rotated, &archived)
            .await
            .unwrap();

        assert!(!rotated.exists());
        assert!(archived.exists());

        let listing = std::process::Command::new(TAR)
            .arg("tf")
            .arg(&archived)
            .output()
            .unwrap();
        assert!(listing.status.success());
        let entries: Vec<String> = String::from_utf8(listing.stdout)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(entries, vec!["app.log.20240101".to_string()]);
    }

    #[tokio::test]
    async fn test_xz_archive_holds_single_flat_entry() {
        archive_and_list(TarCodec::Xz, ".tar.xz").await;
    }

    #[tokio::test]
    async fn test_bzip2_archive_holds_single_flat_entry() {
        archive_and_list(TarCodec::Bzip2, ".tar.bz2").await;
    }
}
