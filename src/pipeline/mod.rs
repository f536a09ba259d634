//! Reconciliation pipeline.
//!
//! - `RunLock` / `ScrapeSequencer`: one-at-a-time, delay-spaced item fetching
//! - `diff`: pure membership and update classification
//! - `Reconciler`: the incremental-check and full-refresh cycles
//! - `run_watch`: the two periodic triggers

pub mod diff;
mod reconcile;
mod run_lock;
mod scheduler;
mod sequencer;

pub use reconcile::Reconciler;
pub use run_lock::{RunGuard, RunLock};
pub use scheduler::run_watch;
pub use sequencer::ScrapeSequencer;
