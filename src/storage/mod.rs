//! Storage abstractions for the durable collection mirror.
//!
//! Two whole-document JSON files plus an append-only audit log:
//!
//! ```text
//! {data_dir}/
//! ├── collection.json       # Last committed snapshot + commit timestamp
//! ├── item_details.json     # Mirror of per-item details, keyed by id
//! └── update_log.txt        # Append-only audit log of changes
//! ```
//!
//! Absence of either document on first read is a valid state, not an error.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{CollectionSnapshot, DetailMap, ItemDetail};

// Re-export for convenience
pub use local::JsonStateStore;

/// The snapshot document as persisted, with its commit timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSnapshot {
    /// The committed snapshot
    pub snapshot: CollectionSnapshot,
    /// When the snapshot was committed
    pub committed_at: DateTime<Utc>,
}

/// Last-committed state as loaded from storage.
///
/// A missing snapshot document marks the first run; a missing detail
/// document loads as an empty map.
#[derive(Debug, Clone, Default)]
pub struct StoredState {
    pub snapshot: Option<StoredSnapshot>,
    pub details: DetailMap,
}

/// Trait for durable state backends.
///
/// The detail map of record is owned here; the reconciliation engine
/// proposes deltas and removals through `commit` and never mutates the
/// persisted map directly.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the last-committed snapshot and detail map.
    async fn load(&self) -> Result<StoredState>;

    /// Commit a new snapshot and merge detail deltas into the mirror.
    ///
    /// Overwrites the snapshot document (stamped with the commit time),
    /// upserts `deltas` by id, deletes `removed_ids`, and rewrites both
    /// documents in full.
    async fn commit(
        &self,
        snapshot: &CollectionSnapshot,
        deltas: &[ItemDetail],
        removed_ids: &[String],
    ) -> Result<()>;

    /// Append one timestamped block to the audit log.
    async fn append_audit(&self, block: &str) -> Result<()>;
}
