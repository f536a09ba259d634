// src/models/changeset.rs

//! Change classification produced by one incremental reconciliation cycle.

use serde::{Deserialize, Serialize};

use super::item::ItemDetail;

/// Kind of change detected for a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "Added",
            ChangeKind::Updated => "Updated",
            ChangeKind::Removed => "Removed",
        }
    }
}

/// The added / removed / updated classification for one cycle.
///
/// An identifier appears in at most one of the three sets: the sets are
/// derived from disjoint membership predicates in the reconciliation engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChangeSet {
    /// Details of items newly present in the collection
    pub added: Vec<ItemDetail>,
    /// Identifiers of items no longer present in the collection
    pub removed: Vec<String>,
    /// Fresh details of items whose metadata changed
    pub updated: Vec<ItemDetail>,
}

impl ChangeSet {
    /// Check if there are any changes.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.updated.len()
    }

    /// Detail records to merge into the mirror on commit.
    pub fn detail_deltas(&self) -> Vec<ItemDetail> {
        self.added.iter().chain(self.updated.iter()).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let changes = ChangeSet::default();
        assert!(changes.is_empty());
        assert_eq!(changes.change_count(), 0);
    }

    #[test]
    fn test_counts_and_deltas() {
        let changes = ChangeSet {
            added: vec![ItemDetail::unavailable("1")],
            removed: vec!["2".to_string()],
            updated: vec![ItemDetail::unavailable("3")],
        };
        assert!(!changes.is_empty());
        assert_eq!(changes.change_count(), 3);

        let delta_ids: Vec<String> = changes
            .detail_deltas()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(delta_ids, vec!["1", "3"]);
    }
}
