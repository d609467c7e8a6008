//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`IMirrorFileSystem`] using `tokio::fs` for async file operations.
//!
//! ## Design Decisions
//!
//! - **Missing is not an error**: `stat`/`lstat` map `NotFound` to `Ok(None)`.
//! - **Metadata-preserving copy**: `std::fs::copy` followed by
//!   `filetime::set_file_times`, run on `spawn_blocking` so the runtime is
//!   never blocked by a large file.
//! - **No link following on removal**: a symlink is always removed with
//!   `remove_file`, even when it points at a directory.

use std::ffi::OsString;
use std::fs::{FileType, Metadata};
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use filetime::FileTime;
use foldersync_core::ports::{EntryKind, IMirrorFileSystem};
use tracing::{debug, instrument};

// ============================================================================
// LocalFileSystemAdapter struct
// ============================================================================

/// Adapter that bridges the [`IMirrorFileSystem`] port to the real filesystem.
///
/// Zero-sized: every operation takes absolute paths from the engine.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystemAdapter;

impl LocalFileSystemAdapter {
    /// Create a new `LocalFileSystemAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn kind_of(file_type: FileType) -> EntryKind {
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_symlink() {
        EntryKind::Symlink
    } else {
        EntryKind::Other
    }
}

fn optional_kind(result: std::io::Result<Metadata>) -> anyhow::Result<Option<EntryKind>> {
    match result {
        Ok(meta) => Ok(Some(kind_of(meta.file_type()))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Copy `source` over `destination` and carry the access and modification
/// times across. Blocking; call from `spawn_blocking`.
fn copy_with_times(source: &Path, destination: &Path) -> std::io::Result<u64> {
    let bytes = std::fs::copy(source, destination)?;
    let meta = std::fs::metadata(source)?;
    filetime::set_file_times(
        destination,
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )?;
    Ok(bytes)
}

// ============================================================================
// IMirrorFileSystem implementation
// ============================================================================

#[async_trait::async_trait]
impl IMirrorFileSystem for LocalFileSystemAdapter {
    async fn stat(&self, path: &Path) -> anyhow::Result<Option<EntryKind>> {
        optional_kind(tokio::fs::metadata(path).await)
    }

    async fn lstat(&self, path: &Path) -> anyhow::Result<Option<EntryKind>> {
        optional_kind(tokio::fs::symlink_metadata(path).await)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn list_dir(&self, path: &Path) -> anyhow::Result<Vec<OsString>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name());
        }
        debug!(count = names.len(), "directory listed");
        Ok(names)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn create_dir_all(&self, path: &Path) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(path).await?;
        debug!("directory created");
        Ok(())
    }

    #[instrument(skip(self), fields(source = %source.display(), destination = %destination.display()))]
    async fn copy_file(&self, source: &Path, destination: &Path) -> anyhow::Result<()> {
        let src = source.to_path_buf();
        let dst = destination.to_path_buf();

        let bytes = tokio::task::spawn_blocking(move || copy_with_times(&src, &dst))
            .await
            .context("copy task panicked")??;

        debug!(bytes, "file copied");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn remove_file(&self, path: &Path) -> anyhow::Result<()> {
        tokio::fs::remove_file(path).await?;
        debug!("file removed");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn remove_dir_all(&self, path: &Path) -> anyhow::Result<()> {
        // remove_dir_all on a symlink would fail on some platforms and follow
        // it on none; unlink it directly instead.
        let meta = tokio::fs::symlink_metadata(path).await?;
        if meta.file_type().is_symlink() {
            tokio::fs::remove_file(path).await?;
        } else {
            tokio::fs::remove_dir_all(path).await?;
        }
        debug!("directory removed");
        Ok(())
    }
}

// ============================================================================
// Unit tests
// ============================================================================
