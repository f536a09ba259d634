// src/pipeline/run_lock.rs

//! Mutual exclusion for scrape batches.
//!
//! At most one batch may be in flight at a time; a caller that finds the
//! lock held must skip its run rather than queue or block.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide try-acquire/skip lock guarding the scrape sequencer.
///
/// Clones share the same underlying flag.
#[derive(Clone, Debug, Default)]
pub struct RunLock {
    held: Arc<AtomicBool>,
}

impl RunLock {
    /// Create a new, free lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to acquire the lock without waiting.
    ///
    /// Returns `None` if another batch is active. The returned guard
    /// releases the lock on drop, on every exit path.
    pub fn try_acquire(&self) -> Option<RunGuard> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                held: Arc::clone(&self.held),
            })
    }

    /// Whether a batch currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Scoped ownership of the run lock.
#[derive(Debug)]
pub struct RunGuard {
    held: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let lock = RunLock::new();
        assert!(!lock.is_held());

        let guard = lock.try_acquire().unwrap();
        assert!(lock.is_held());

        drop(guard);
        assert!(!lock.is_held());
    }

    #[test]
    fn test_second_acquire_skips() {
        let lock = RunLock::new();
        let _guard = lock.try_acquire().unwrap();
        assert!(lock.try_acquire().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let lock = RunLock::new();
        let other = lock.clone();

        let _guard = lock.try_acquire().unwrap();
        assert!(other.is_held());
        assert!(other.try_acquire().is_none());
    }

    #[test]
    fn test_released_on_early_exit() {
        let lock = RunLock::new();
        {
            let _guard = lock.try_acquire().unwrap();
            // guard dropped by scope exit
        }
        assert!(lock.try_acquire().is_some());
    }
}
