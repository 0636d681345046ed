//! Periodic refresh of the schedule list.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::schedules::ScheduleManager;

/// Refresh the schedule list every `interval` until `cancel` fires.
pub async fn run(schedules: Arc<ScheduleManager>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Schedule poller started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Schedule poller stopping");
                break;
            }
            _ = ticker.tick() => {
                let _ = schedules.refresh().await;
            }
        }
    }
}
