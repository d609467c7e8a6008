//! FolderSync Audit - Sync event log
//!
//! Provides:
//! - `AuditLogger`: High-level service that records one `SyncEvent` per operation
//! - `FileEventSink`: Append-mode log file mirrored to the console
//! - `MemoryEventSink`: In-memory sink for tests and embedding

pub mod file_sink;
pub mod logger;
pub mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use file_sink::FileEventSink;
pub use logger::AuditLogger;
pub use memory::MemoryEventSink;

/// Errors raised while setting up an event sink
#[derive(Debug, Error)]
pub enum AuditError {
    /// The directory that should hold the log file could not be created
    #[error("Cannot create log directory {path}: {source}")]
    CreateLogDir {
        /// Directory that failed to be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The log file could not be opened for appending
    #[error("Cannot open log file {path} for writing: {source}")]
    OpenLogFile {
        /// Log file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
