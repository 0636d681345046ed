//! Periodic refresh of the task list.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::monitor::TaskMonitor;

/// Refresh the task list every `interval` until `cancel` fires.
///
/// The first tick fires immediately. A failed tick keeps the cached list
/// (the monitor logs the failure) and the loop carries on.
pub async fn run(monitor: Arc<TaskMonitor>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "Task list poller started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Task list poller stopping");
                break;
            }
            _ = ticker.tick() => {
                let _ = monitor.refresh_tasks().await;
            }
        }
    }
}
