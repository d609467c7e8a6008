//! FolderSync Core - Domain types, configuration and ports
//!
//! This crate contains everything the mirror engine and its adapters agree on:
//! - **Domain types** - `SyncEvent`, `SyncAction`, `SyncInterval`, `DomainError`
//! - **Configuration** - validated `Config` built from the command line
//! - **Port definitions** - Traits for adapters: `IMirrorFileSystem`, `IEventSink`, `IClock`
//!
//! # Architecture
//!
//! The domain module holds plain data with no I/O. Ports define the trait
//! interfaces that the sync and audit crates implement, so the engine can be
//! exercised against in-memory sinks, failing filesystems and virtual clocks.

pub mod config;
pub mod domain;
pub mod ports;
