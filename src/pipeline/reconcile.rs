//! Reconciliation engine.
//!
//! Compares current collection membership and freshly-fetched details
//! against the durable mirror, produces a change set, drives notification
//! fan-out, and commits the new state. Two entry points mirror the two
//! scheduler triggers: the frequent incremental check and the infrequent
//! full refresh.

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::models::{ChangeSet, DetailMap};
use crate::pipeline::ScrapeSequencer;
use crate::pipeline::diff::{classify_updates, membership_delta, recheck_candidates};
use crate::services::{CollectionSource, Notifier};
use crate::storage::StateStore;

/// The reconciliation engine.
pub struct Reconciler {
    collection: Arc<dyn CollectionSource>,
    sequencer: ScrapeSequencer,
    notifier: Notifier,
    store: Arc<dyn StateStore>,
}

impl Reconciler {
    /// Wire the engine to its collaborators.
    pub fn new(
        collection: Arc<dyn CollectionSource>,
        sequencer: ScrapeSequencer,
        notifier: Notifier,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            collection,
            sequencer,
            notifier,
            store,
        }
    }

    /// Run one incremental check.
    ///
    /// Detects added, removed and updated members, notifies once per change,
    /// and commits the new state. A failed collection fetch aborts the cycle
    /// silently; it is a transient condition retried on the next tick. A
    /// cycle with no changes touches neither the store nor the audit log.
    pub async fn check(&self) -> Result<()> {
        let snapshot = match self.collection.fetch_collection().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                log::warn!("Collection fetch failed, skipping cycle: {}", error);
                return Ok(());
            }
        };

        let state = self.store.load().await?;
        let Some(prior) = &state.snapshot else {
            // First run establishes the baseline; it is not a change.
            log::info!(
                "No prior state, establishing baseline for {} items",
                snapshot.len()
            );
            if let Some(details) = self.sequencer.scrape(&snapshot.item_ids).await {
                self.store.commit(&snapshot, &details, &[]).await?;
            }
            return Ok(());
        };

        let (to_add, to_remove) = membership_delta(&snapshot.item_ids, &state.details);

        let added = if to_add.is_empty() {
            Vec::new()
        } else {
            // A skipped batch leaves the ids unmirrored; they are picked up
            // again on the next cycle.
            self.sequencer.scrape(&to_add).await.unwrap_or_default()
        };

        // Re-verify existing members only when the raw upstream payload
        // changed; this bounds scrape volume to actual collection changes.
        let mut updated = Vec::new();
        if !snapshot.same_raw(&prior.snapshot) {
            let candidates = recheck_candidates(&snapshot.item_ids, &state.details, &to_add);
            if !candidates.is_empty() {
                log::info!(
                    "Collection payload changed, re-checking {} existing items",
                    candidates.len()
                );
                if let Some(fresh) = self.sequencer.scrape(&candidates).await {
                    updated = classify_updates(fresh, &state.details);
                }
            }
        }

        let changes = ChangeSet {
            added,
            removed: to_remove,
            updated,
        };
        if changes.is_empty() {
            log::debug!("No changes detected");
            return Ok(());
        }

        log::info!(
            "Collection changed: {} added, {} removed, {} updated",
            changes.added.len(),
            changes.removed.len(),
            changes.updated.len()
        );

        self.notifier.dispatch(&changes, &state.details).await;
        self.store
            .commit(&snapshot, &changes.detail_deltas(), &changes.removed)
            .await?;
        self.store
            .append_audit(&audit_block(&changes, &state.details))
            .await?;

        Ok(())
    }

    /// Run one full refresh.
    ///
    /// Unconditionally re-scrapes every member of the stored snapshot and
    /// commits the fresh details wholesale. This is a freshness sweep, not a
    /// change-notification cycle: no change set is computed, nothing is
    /// notified or audited.
    pub async fn refresh(&self) -> Result<()> {
        let state = self.store.load().await?;
        let Some(prior) = state.snapshot else {
            log::info!("Initial data not available for refresh");
            return Ok(());
        };

        log::info!("Refreshing all {} items", prior.snapshot.len());
        if let Some(details) = self.sequencer.scrape(&prior.snapshot.item_ids).await {
            self.store.commit(&prior.snapshot, &details, &[]).await?;
        }
        Ok(())
    }
}

/// Format one audit-log block listing additions and removals.
///
/// Removed titles come from the prior detail map since the items no longer
/// have live detail.
fn audit_block(changes: &ChangeSet, prior: &DetailMap) -> String {
    let mut block = format!("[{}] Update Detected:\n", Utc::now().to_rfc3339());

    if !changes.added.is_empty() {
        block.push_str(&format!("Added Items ({}):\n", changes.added.len()));
        for item in &changes.added {
            block.push_str(&format!(" - {}: {}\n", item.id, item.title));
        }
    }

    if !changes.removed.is_empty() {
        block.push_str(&format!("Removed Items ({}):\n", changes.removed.len()));
        for id in &changes.removed {
            let title = prior
                .get(id)
                .map(|item| item.title.as_str())
                .unwrap_or("Unknown Title");
            block.push_str(&format!(" - {}: {}\n", id, title));
        }
    }

    block
}
