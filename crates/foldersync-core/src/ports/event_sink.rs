//! Event sink port (driven/secondary port)
//!
//! A sink is where rendered [`SyncEvent`]s end up: the persistent log file
//! mirrored to the console in production, or an in-memory buffer in tests.
//! The sink is constructed once at startup and injected into every
//! component that records events.

use crate::domain::SyncEvent;

/// Port trait for recording sync events
///
/// Implementations receive events in emission order and must preserve it.
#[async_trait::async_trait]
pub trait IEventSink: Send + Sync {
    /// Records one event
    ///
    /// # Errors
    /// Returns an error if the event could not be persisted. Callers treat
    /// this as non-fatal.
    async fn emit(&self, event: &SyncEvent) -> anyhow::Result<()>;

    /// Flushes any buffered output
    async fn flush(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
