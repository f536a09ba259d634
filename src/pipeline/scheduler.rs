//! Periodic trigger scheduling.
//!
//! Two independent timers drive the engine: a frequent incremental check and
//! an infrequent full refresh, plus one incremental check at startup. The
//! timers run on independent schedules and may fire concurrently; the shared
//! run lock inside the sequencer is what keeps their scrape batches from
//! overlapping, and a trigger that finds it held skips its cycle. No
//! ordering is guaranteed between the two triggers beyond that.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::models::ScheduleConfig;
use crate::pipeline::Reconciler;

/// Run the watch loop until the process is stopped.
pub async fn run_watch(reconciler: Arc<Reconciler>, schedule: &ScheduleConfig) -> Result<()> {
    log::info!(
        "Watching collection (check every {}s, full refresh every {}s)",
        schedule.check_interval_secs,
        schedule.refresh_interval_secs
    );

    // Run-at-startup incremental check
    if let Err(error) = reconciler.check().await {
        log::error!("Incremental check failed: {}", error);
    }

    let check_task = {
        let reconciler = Arc::clone(&reconciler);
        let period = Duration::from_secs(schedule.check_interval_secs);
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; the startup check covered it.
            timer.tick().await;
            loop {
                timer.tick().await;
                if let Err(error) = reconciler.check().await {
                    log::error!("Incremental check failed: {}", error);
                }
            }
        })
    };

    let refresh_task = {
        let reconciler = Arc::clone(&reconciler);
        let period = Duration::from_secs(schedule.refresh_interval_secs);
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer.tick().await;
            loop {
                timer.tick().await;
                if let Err(error) = reconciler.refresh().await {
                    log::error!("Full refresh failed: {}", error);
                }
            }
        })
    };

    // The tasks only finish if they panic.
    let _ = tokio::join!(check_task, refresh_task);
    Ok(())
}
