// src/models/snapshot.rs

//! Collection snapshot data structure.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The upstream collection's member list at a point in time.
///
/// `raw` is the full upstream response body, kept opaque: it is compared for
/// structural equality to detect collection changes cheaply, never parsed
/// beyond the initial extraction of `item_ids`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionSnapshot {
    /// Ordered, unique member item identifiers
    pub item_ids: Vec<String>,

    /// Opaque copy of the raw upstream response
    pub raw: serde_json::Value,
}

impl CollectionSnapshot {
    /// Create a snapshot, deduplicating ids while preserving order.
    pub fn new(item_ids: Vec<String>, raw: serde_json::Value) -> Self {
        let mut seen = HashSet::new();
        let item_ids = item_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Self { item_ids, raw }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    /// Whether the collection has no members.
    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }

    /// Whether the raw upstream payload matches another snapshot's.
    pub fn same_raw(&self, other: &CollectionSnapshot) -> bool {
        self.raw == other.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserves_order() {
        let snap = CollectionSnapshot::new(
            vec!["3".into(), "1".into(), "3".into(), "2".into()],
            serde_json::json!({}),
        );
        assert_eq!(snap.item_ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_same_raw() {
        let a = CollectionSnapshot::new(vec!["1".into()], serde_json::json!({"rev": 1}));
        let b = CollectionSnapshot::new(vec!["1".into()], serde_json::json!({"rev": 1}));
        let c = CollectionSnapshot::new(vec!["1".into()], serde_json::json!({"rev": 2}));
        assert!(a.same_raw(&b));
        assert!(!a.same_raw(&c));
    }
}
