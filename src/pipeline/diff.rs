//! Membership and update classification.
//!
//! Pure helpers behind the reconciliation engine, kept free of I/O so the
//! decision logic is testable in isolation.
//!
//! Membership is always derived from the live snapshot against the detail
//! map of record, never from the detail map's keys alone; a map holding
//! stale or extra entries after a torn commit therefore self-heals on the
//! next cycle.

use std::collections::HashSet;

use crate::models::{DetailMap, ItemDetail};

/// Compute membership deltas between current membership and the mirror.
///
/// Returns `(to_add, to_remove)`:
/// - `to_add`: members present now but absent from the detail map;
/// - `to_remove`: detail-map ids absent from the current membership.
///
/// The two sets are derived from disjoint predicates, so no id can appear
/// in both.
pub fn membership_delta(current_ids: &[String], details: &DetailMap) -> (Vec<String>, Vec<String>) {
    let current: HashSet<&str> = current_ids.iter().map(String::as_str).collect();

    let to_add = current_ids
        .iter()
        .filter(|id| !details.contains_key(*id))
        .cloned()
        .collect();

    let to_remove = details
        .keys()
        .filter(|id| !current.contains(id.as_str()))
        .cloned()
        .collect();

    (to_add, to_remove)
}

/// Members that need re-verification when the raw collection payload changed:
/// already mirrored, still present, and not part of the newly added set.
pub fn recheck_candidates(
    current_ids: &[String],
    details: &DetailMap,
    to_add: &[String],
) -> Vec<String> {
    let added: HashSet<&str> = to_add.iter().map(String::as_str).collect();
    current_ids
        .iter()
        .filter(|id| details.contains_key(*id) && !added.contains(id.as_str()))
        .cloned()
        .collect()
}

/// Classify freshly-fetched details as updated.
///
/// An item is updated iff its declared file size or last-updated date differs
/// from the stored value for that id. Items without a stored counterpart are
/// never classified here; they belong to the added set.
pub fn classify_updates(fresh: Vec<ItemDetail>, details: &DetailMap) -> Vec<ItemDetail> {
    fresh
        .into_iter()
        .filter(|item| {
            details
                .get(&item.id)
                .is_some_and(|stored| item.differs_from(stored))
        })
        .collect()
}
