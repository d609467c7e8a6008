//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! mirror engine. Ports are interfaces that the engine depends on, but
//! whose implementations live in adapter crates (or in tests).
//!
//! ## Ports Overview
//!
//! - [`IMirrorFileSystem`] - Directory listing, copying and removal
//! - [`IEventSink`] - Destination for rendered sync events (log file, console, memory)
//! - [`IClock`] - Time source and sleep used by the scheduler

pub mod clock;
pub mod event_sink;
pub mod local_filesystem;

pub use clock::{IClock, ManualClock, TokioClock};
pub use event_sink::IEventSink;
pub use local_filesystem::{EntryKind, IMirrorFileSystem};
