//! In-memory event sink
//!
//! Keeps every emitted event in a `Vec`, in emission order. Used by tests
//! to assert on exactly what a mirror run logged without touching files.

use std::sync::Mutex;

use foldersync_core::{
    domain::{SyncAction, SyncEvent},
    ports::IEventSink,
};

/// Event sink that records events in memory
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<SyncEvent>>,
}

impl MemoryEventSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded event.
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Rendered log lines, as the file sink would write them.
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(SyncEvent::log_line).collect()
    }

    /// Number of recorded events with the given action.
    pub fn count(&self, action: SyncAction) -> usize {
        self.events
            .lock()
            .map(|e| e.iter().filter(|ev| ev.action() == action).count())
            .unwrap_or_default()
    }

    /// Discard all recorded events.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

#[async_trait::async_trait]
impl IEventSink for MemoryEventSink {
    async fn emit(&self, event: &SyncEvent) -> anyhow::Result<()> {
        self.events
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sink poisoned"))?
            .push(event.clone());
        Ok(())
    }
}
