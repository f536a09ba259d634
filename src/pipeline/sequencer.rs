// src/pipeline/sequencer.rs

//! Throttled scrape sequencing.
//!
//! Drives the detail fetcher across an ordered batch of ids with exactly one
//! fetch in flight at a time and a fixed delay between fetches, to respect
//! upstream rate limits.

use std::sync::Arc;
use std::time::Duration;

use crate::models::ItemDetail;
use crate::pipeline::RunLock;
use crate::services::DetailSource;

/// Sequencer that fetches item details one at a time, delay-spaced.
pub struct ScrapeSequencer {
    source: Arc<dyn DetailSource>,
    lock: RunLock,
    delay: Duration,
}

impl ScrapeSequencer {
    /// Create a sequencer over the given detail source.
    pub fn new(source: Arc<dyn DetailSource>, lock: RunLock, delay: Duration) -> Self {
        Self {
            source,
            lock,
            delay,
        }
    }

    /// Fetch details for every id, in input order.
    ///
    /// Returns `None` when another batch holds the run lock: the run is
    /// skipped, never queued or merged with the in-progress one. Per-item
    /// fetch failures surface as sentinel records in the output, so the lock
    /// is released on every exit path via the guard.
    pub async fn scrape(&self, ids: &[String]) -> Option<Vec<ItemDetail>> {
        let _guard = match self.lock.try_acquire() {
            Some(guard) => guard,
            None => {
                log::warn!(
                    "Scrape already in progress, skipping batch of {} items",
                    ids.len()
                );
                return None;
            }
        };

        log::info!("Starting to scrape {} items", ids.len());
        let mut results = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            log::info!("Fetching details for item {}", id);
            results.push(self.source.fetch_detail(id).await);
        }

        log::info!("Completed scraping {} items", results.len());
        Some(results)
    }
}
