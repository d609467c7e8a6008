//! AuditLogger - high-level sync event logging service
//!
//! Wraps an injected [`IEventSink`] with one convenience method per kind of
//! auditable operation. All methods are non-fatal: a sink failure is logged
//! via `tracing::warn!` but never propagated, so logging problems never
//! abort a mirror run.

use std::path::Path;
use std::sync::Arc;

use foldersync_core::{domain::SyncEvent, ports::IEventSink};

/// High-level logger that stamps and emits [`SyncEvent`]s.
///
/// Every method returns the event it emitted so callers can collect the
/// sequence of applied operations.
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn IEventSink>,
}

impl AuditLogger {
    /// Creates a new `AuditLogger` backed by the given sink.
    pub fn new(sink: Arc<dyn IEventSink>) -> Self {
        Self { sink }
    }

    /// Emit an event, swallowing sink errors with a tracing warning.
    async fn save(&self, event: SyncEvent) -> SyncEvent {
        if let Err(e) = self.sink.emit(&event).await {
            tracing::warn!(
                error = %e,
                action = %event.action(),
                "Failed to record sync event"
            );
        }
        event
    }

    // ========================================================================
    // Replica mutations
    // ========================================================================

    /// Log the creation of a replica directory.
    pub async fn log_create_dir(&self, path: &Path) -> SyncEvent {
        self.save(SyncEvent::create_dir(path)).await
    }

    /// Log a file copy from the source tree into the replica tree.
    pub async fn log_copy_file(&self, source: &Path, destination: &Path) -> SyncEvent {
        self.save(SyncEvent::copy_file(source, destination)).await
    }

    /// Log the removal of a replica file.
    pub async fn log_remove_file(&self, path: &Path) -> SyncEvent {
        self.save(SyncEvent::remove_file(path)).await
    }

    /// Log the removal of a replica directory subtree.
    pub async fn log_remove_dir(&self, path: &Path) -> SyncEvent {
        self.save(SyncEvent::remove_dir(path)).await
    }

    // ========================================================================
    // Errors and lifecycle
    // ========================================================================

    /// Log a failed operation on `path`.
    pub async fn log_error(&self, path: &Path, message: &str) -> SyncEvent {
        self.save(SyncEvent::error(path, message)).await
    }

    /// Log the end of a scheduler tick.
    pub async fn log_sync_complete(&self) -> SyncEvent {
        self.save(SyncEvent::sync_complete()).await
    }

    /// Flush the underlying sink, swallowing errors.
    pub async fn flush(&self) {
        if let Err(e) = self.sink.flush().await {
            tracing::warn!(error = %e, "Failed to flush event sink");
        }
    }
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use async_trait::async_trait;
    use foldersync_core::domain::SyncAction;

    use super::*;
    use crate::MemoryEventSink;

    /// Sink that rejects every event
    struct FailingSink;

    #[async_trait]
    impl IEventSink for FailingSink {
        async fn emit(&self, _event: &SyncEvent) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }

        async fn flush(&self) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[tokio::test]
    async fn test_log_create_dir() {
        let sink = Arc::new(MemoryEventSink::new());
        let logger = AuditLogger::new(sink.clone());

        let event = logger.log_create_dir(Path::new("/replica/sub")).await;

        assert_eq!(event.action(), SyncAction::CreateDir);
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], event);
    }

    #[tokio::test]
    async fn test_log_copy_file() {
        let sink = Arc::new(MemoryEventSink::new());
        let logger = AuditLogger::new(sink.clone());

        logger
            .log_copy_file(Path::new("/source/a.txt"), Path::new("/replica/a.txt"))
            .await;

        let events = sink.events();
        assert_eq!(events[0].action(), SyncAction::CopyFile);
        assert_eq!(events[0].path(), Some(Path::new("/source/a.txt")));
        assert_eq!(events[0].destination(), Some(Path::new("/replica/a.txt")));
    }

    #[tokio::test]
    async fn test_events_keep_emission_order() {
        let sink = Arc::new(MemoryEventSink::new());
        let logger = AuditLogger::new(sink.clone());

        logger.log_remove_file(Path::new("/r/ghost.txt")).await;
        logger.log_remove_dir(Path::new("/r/stale")).await;
        logger
            .log_error(Path::new("/r/locked"), "Failed to remove file")
            .await;
        logger.log_sync_complete().await;

        let actions: Vec<SyncAction> = sink.events().iter().map(|e| e.action()).collect();
        assert_eq!(
            actions,
            vec![
                SyncAction::RemoveFile,
                SyncAction::RemoveDir,
                SyncAction::Error,
                SyncAction::SyncComplete,
            ]
        );
    }

    #[tokio::test]
    async fn test_sink_errors_are_swallowed() {
        let logger = AuditLogger::new(Arc::new(FailingSink));

        // Must not panic or propagate.
        let event = logger.log_remove_file(&PathBuf::from("/r/x")).await;
        logger.flush().await;

        assert_eq!(event.action(), SyncAction::RemoveFile);
    }
}
