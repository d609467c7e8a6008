//! Sync event domain entities
//!
//! A [`SyncEvent`] is the record of one applied (or failed) filesystem
//! operation. Events are append-only: once emitted they are never mutated.
//! Their rendered form is the line written to the log file and the console.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// `strftime` pattern used for event timestamps in log lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Actions that can be recorded for a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncAction {
    /// A replica directory was created
    CreateDir,
    /// A source file was copied over its replica counterpart
    CopyFile,
    /// A replica file absent from the source was removed
    RemoveFile,
    /// A replica directory subtree absent from the source was removed
    RemoveDir,
    /// An operation failed
    Error,
    /// A scheduler tick finished (lifecycle marker, not an operation)
    SyncComplete,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncAction::CreateDir => "create-dir",
            SyncAction::CopyFile => "copy-file",
            SyncAction::RemoveFile => "remove-file",
            SyncAction::RemoveDir => "remove-dir",
            SyncAction::Error => "error",
            SyncAction::SyncComplete => "sync-complete",
        };
        write!(f, "{}", s)
    }
}

/// One logged fact about a sync run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEvent {
    /// When the event was recorded (local time, as written to the log)
    timestamp: DateTime<Local>,
    /// What happened
    action: SyncAction,
    /// Primary path: the replica path, or the source path for copies
    path: Option<PathBuf>,
    /// Copy destination (only for `CopyFile`)
    destination: Option<PathBuf>,
    /// Error text (only for `Error`)
    detail: Option<String>,
}

impl SyncEvent {
    fn new(action: SyncAction) -> Self {
        Self {
            timestamp: Local::now(),
            action,
            path: None,
            destination: None,
            detail: None,
        }
    }

    /// A replica directory was created
    pub fn create_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::new(SyncAction::CreateDir)
        }
    }

    /// A file was copied from `source` to `destination`
    pub fn copy_file(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(source.into()),
            destination: Some(destination.into()),
            ..Self::new(SyncAction::CopyFile)
        }
    }

    /// A replica file was removed
    pub fn remove_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::new(SyncAction::RemoveFile)
        }
    }

    /// A replica directory and everything below it was removed
    pub fn remove_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::new(SyncAction::RemoveDir)
        }
    }

    /// An operation on `path` failed; `message` is the full user-facing text
    pub fn error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            detail: Some(message.into()),
            ..Self::new(SyncAction::Error)
        }
    }

    /// A scheduler tick finished
    pub fn sync_complete() -> Self {
        Self::new(SyncAction::SyncComplete)
    }

    /// Overrides the timestamp (used for reproducible log lines)
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns when the event was recorded
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Returns the action type
    pub fn action(&self) -> SyncAction {
        self.action
    }

    /// Returns the primary path, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the copy destination, if any
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// The human-readable message, without timestamp
    pub fn message(&self) -> String {
        let path = self
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        match self.action {
            SyncAction::CreateDir => format!("Created directory: {path}"),
            SyncAction::CopyFile => {
                let destination = self
                    .destination
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                format!("Copied file: {path} to {destination}")
            }
            SyncAction::RemoveFile => format!("Removed file: {path}"),
            SyncAction::RemoveDir => format!("Removed directory: {path}"),
            SyncAction::Error => self
                .detail
                .clone()
                .unwrap_or_else(|| format!("Operation failed: {path}")),
            SyncAction::SyncComplete => "Synchronization complete.".to_string(),
        }
    }

    /// The full log line: `YYYY-MM-DD HH:MM:SS - <message>`
    pub fn log_line(&self) -> String {
        format!(
            "{} - {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.message()
        )
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.log_line())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 4, 14, 9, 5, 7).unwrap()
    }

    #[test]
    fn test_sync_action_display() {
        assert_eq!(SyncAction::CreateDir.to_string(), "create-dir");
        assert_eq!(SyncAction::CopyFile.to_string(), "copy-file");
        assert_eq!(SyncAction::RemoveFile.to_string(), "remove-file");
        assert_eq!(SyncAction::RemoveDir.to_string(), "remove-dir");
        assert_eq!(SyncAction::Error.to_string(), "error");
        assert_eq!(SyncAction::SyncComplete.to_string(), "sync-complete");
    }

    #[test]
    fn test_sync_action_serialization() {
        let json = serde_json::to_string(&SyncAction::RemoveDir).unwrap();
        assert_eq!(json, "\"remove-dir\"");

        let deserialized: SyncAction = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, SyncAction::RemoveDir);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            SyncEvent::create_dir("/r/sub").message(),
            "Created directory: /r/sub"
        );
        assert_eq!(
            SyncEvent::copy_file("/s/a.txt", "/r/a.txt").message(),
            "Copied file: /s/a.txt to /r/a.txt"
        );
        assert_eq!(
            SyncEvent::remove_file("/r/ghost.txt").message(),
            "Removed file: /r/ghost.txt"
        );
        assert_eq!(
            SyncEvent::remove_dir("/r/stale").message(),
            "Removed directory: /r/stale"
        );
        assert_eq!(
            SyncEvent::error("/s", "Source folder '/s' does not exist.").message(),
            "Source folder '/s' does not exist."
        );
        assert_eq!(
            SyncEvent::sync_complete().message(),
            "Synchronization complete."
        );
    }

    #[test]
    fn test_log_line_format() {
        let event = SyncEvent::remove_file("/r/x").with_timestamp(fixed_time());
        assert_eq!(event.log_line(), "2024-04-14 09:05:07 - Removed file: /r/x");
        assert_eq!(event.to_string(), event.log_line());
    }

    #[test]
    fn test_accessors() {
        let event = SyncEvent::copy_file("/s/a", "/r/a");
        assert_eq!(event.action(), SyncAction::CopyFile);
        assert_eq!(event.path(), Some(Path::new("/s/a")));
        assert_eq!(event.destination(), Some(Path::new("/r/a")));

        let complete = SyncEvent::sync_complete();
        assert!(complete.path().is_none());
    }

    #[test]
    fn test_event_serialization() {
        let event = SyncEvent::error("/r/locked", "Failed to remove file '/r/locked': busy")
            .with_timestamp(fixed_time());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "error");
        assert_eq!(json["path"], "/r/locked");
        assert_eq!(json["detail"], "Failed to remove file '/r/locked': busy");
    }
}
