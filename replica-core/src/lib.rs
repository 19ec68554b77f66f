//! # Replica Core Library
//!
//! Shared foundation for the watch-side printer replica: the data that is
//! mirrored from the phone, and the machinery that keeps it fresh.
//!
//! ## Modules
//! - `model`: Replicated data types (`PrinterRecord`, `ReplicaSnapshot`).
//! - `store`: In-memory record store (single writer, many readers).
//! - `registry`: Subscriber registry fanning out change notifications.
//! - `channel`: Replication channel pulling/pushing data over a phone link.

pub mod channel;
pub mod model;
pub mod registry;
pub mod store;
