//! Local filesystem port (driven/secondary port)
//!
//! This module defines the interface the mirror engine uses to inspect and
//! mutate the source and replica trees.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific;
//!   the engine only needs the rendered cause for its error events.
//! - Missing paths are not errors for the inspection methods: `stat` and
//!   `lstat` return `Ok(None)` so callers can branch on existence.
//! - `stat` follows symbolic links (what the copy primitive sees), `lstat`
//!   does not (what a removal acts on).

use std::ffi::OsString;
use std::path::Path;

// ============================================================================
// EntryKind
// ============================================================================

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link (only reported by [`IMirrorFileSystem::lstat`])
    Symlink,
    /// Anything else: FIFOs, sockets, device nodes
    Other,
}

// ============================================================================
// IMirrorFileSystem trait
// ============================================================================

/// Port trait for the filesystem operations of one mirror run
///
/// ## Implementation Notes
///
/// - `copy_file` must overwrite an existing destination file and should
///   carry the source modification time over to the destination.
/// - `remove_dir_all` removes the directory and everything beneath it.
/// - Implementations must not follow symbolic links when removing.
#[async_trait::async_trait]
pub trait IMirrorFileSystem: Send + Sync {
    /// Returns the kind of `path`, following symbolic links
    ///
    /// Returns `Ok(None)` if the path (or a link's target) does not exist.
    async fn stat(&self, path: &Path) -> anyhow::Result<Option<EntryKind>>;

    /// Returns the kind of `path` itself, without following symbolic links
    ///
    /// Returns `Ok(None)` if the path does not exist.
    async fn lstat(&self, path: &Path) -> anyhow::Result<Option<EntryKind>>;

    /// Lists the names of the immediate children of a directory
    ///
    /// # Errors
    /// Returns an error if the directory doesn't exist or cannot be read
    async fn list_dir(&self, path: &Path) -> anyhow::Result<Vec<OsString>>;

    /// Creates a directory and all missing parents (`mkdir -p`)
    async fn create_dir_all(&self, path: &Path) -> anyhow::Result<()>;

    /// Copies a file, replacing the destination and preserving the mtime
    async fn copy_file(&self, source: &Path, destination: &Path) -> anyhow::Result<()>;

    /// Removes a single file or symbolic link
    async fn remove_file(&self, path: &Path) -> anyhow::Result<()>;

    /// Removes a directory recursively
    async fn remove_dir_all(&self, path: &Path) -> anyhow::Result<()>;
}
