//! Domain entities
//!
//! This module contains the core domain types for FolderSync:
//! - Validated newtypes (`SyncInterval`)
//! - Sync events recorded for every applied or failed operation
//! - Domain-specific error types

pub mod errors;
pub mod event;
pub mod newtypes;

// Re-export commonly used types
pub use errors::DomainError;
pub use event::{SyncAction, SyncEvent, TIMESTAMP_FORMAT};
pub use newtypes::SyncInterval;
