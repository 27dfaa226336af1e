//! # Storage Module
//!
//! ## Why This Module Exists
//! Every accepted input event flows through exactly one durable sink.
//! This module defines that sink: the [`EventStore`] trait describing
//! what a backend must offer (idempotent schema setup, row insertion,
//! category counts) and the [`recorder`] worker that serializes
//! concurrent producers onto a single writer.
//!
//! ## Key Abstractions
//! - **`EventStore`**: the swap point for persistence backends. The
//!   shipped backend is SQLite ([`sqlite::SqliteStore`]); anything that
//!   can insert a row and count rows per category can stand in.
//! - **`RecorderHandle`**: the one choke point producers talk to. It
//!   owns the running event count and guarantees exactly-once
//!   persistence in arrival order.
//!
//! ## Error Handling Strategy
//! Backend failures surface as [`StoreError`]; the recorder retries
//! failed writes with backoff before giving up, so a transient disk
//! hiccup never silently drops the count out of sync with the rows.

pub mod recorder;
pub mod sqlite;

use crate::event::{EventCategory, InputEvent};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Failed to insert event: {0}")]
    Insert(String),

    #[error("Failed to query store: {0}")]
    Query(String),
}

/// Persistence collaborator: one durable row per accepted event.
///
/// `count` must remain answerable after the write path has shut down,
/// which is why the recorder hands the store back to its caller once
/// the queue is drained.
pub trait EventStore: Send + 'static {
    fn insert(&mut self, event: &InputEvent) -> Result<(), StoreError>;

    /// Number of persisted rows, optionally filtered by category.
    fn count(&self, category: Option<EventCategory>) -> Result<u64, StoreError>;
}
