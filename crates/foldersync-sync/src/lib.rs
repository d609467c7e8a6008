//! FolderSync Sync - One-way mirror engine
//!
//! Provides:
//! - Recursive one-way mirroring of a source tree onto a replica tree
//! - A fixed-interval scheduler that re-runs the mirror until shutdown
//!
//! ## Modules
//!
//! - [`engine`] - Mirror engine computing and applying the operation set per directory pair
//! - [`filesystem`] - Local filesystem adapter (mtime-preserving copies)
//! - [`scheduler`] - Interval loop with tick-boundary cancellation

pub mod engine;
pub mod filesystem;
pub mod scheduler;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during a mirror run
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source root does not exist; nothing is applied for this tick
    #[error("Source folder '{}' does not exist.", .0.display())]
    SourceMissing(PathBuf),

    /// The source root exists but is not a directory
    #[error("Source folder '{}' is not a directory.", .0.display())]
    SourceNotDirectory(PathBuf),

    /// The replica root exists but is not a directory
    #[error("Replica folder '{}' is not a directory.", .0.display())]
    ReplicaNotDirectory(PathBuf),

    /// A single entry could not be created, copied, listed or removed
    #[error("Failed to {operation} '{}': {message}", .path.display())]
    EntryOperationFailed {
        /// Operation that failed, e.g. `"copy file"`
        operation: &'static str,
        /// Path the operation acted on
        path: PathBuf,
        /// Rendered cause
        message: String,
    },
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
