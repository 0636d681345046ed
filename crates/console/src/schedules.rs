//! Schedule Manager: the cached schedule list, toggle, confirmed delete
//! and local panel visibility.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use scriptdeck_client::ExecutionService;
use scriptdeck_core::schedule::Schedule;
use scriptdeck_core::types::ScheduleId;
use tokio::sync::RwLock;

use crate::error::{ConsoleError, ConsoleResult};
use crate::notifications::NotificationSink;

#[derive(Debug, Default)]
struct ScheduleList {
    schedules: Vec<Schedule>,
    applied_seq: u64,
}

/// Confirmation token for a schedule deletion.
///
/// Obtained from [`ScheduleManager::request_delete`]; nothing is sent to
/// the service until it is passed to [`ScheduleManager::confirm_delete`].
/// Dropping it cancels the deletion.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pending delete does nothing until confirmed"]
pub struct PendingDelete {
    schedule_id: ScheduleId,
}

impl PendingDelete {
    pub fn schedule_id(&self) -> &str {
        &self.schedule_id
    }
}

pub struct ScheduleManager {
    service: Arc<dyn ExecutionService>,
    notifications: Arc<NotificationSink>,
    schedules: RwLock<ScheduleList>,
    refresh_seq: AtomicU64,
    panel_visible: AtomicBool,
}

impl ScheduleManager {
    pub fn new(service: Arc<dyn ExecutionService>, notifications: Arc<NotificationSink>) -> Self {
        Self {
            service,
            notifications,
            schedules: RwLock::new(ScheduleList::default()),
            refresh_seq: AtomicU64::new(0),
            panel_visible: AtomicBool::new(false),
        }
    }

    /// Fetch the schedule list once.
    ///
    /// Returns `Ok(false)` if the response lost the race to a newer one.
    pub async fn refresh(&self) -> ConsoleResult<bool> {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let schedules = match self.service.list_schedules().await {
            Ok(schedules) => schedules,
            Err(e) => {
                tracing::warn!(error = %e, "Schedule poll failed, keeping cached list");
                return Err(e.into());
            }
        };

        let mut list = self.schedules.write().await;
        if seq < list.applied_seq {
            tracing::debug!(seq, applied = list.applied_seq, "Discarding stale schedule list");
            return Ok(false);
        }
        list.applied_seq = seq;
        list.schedules = schedules;
        Ok(true)
    }

    /// Flip a schedule's enabled flag. Returns the new flag.
    ///
    /// The cache is never flipped locally; the refresh after a successful
    /// toggle brings it in line with the service.
    pub async fn toggle(&self, schedule_id: &str) -> ConsoleResult<bool> {
        let enabled = match self.service.toggle_schedule(schedule_id).await {
            Ok(resp) => resp.enabled,
            Err(e) => {
                let err = ConsoleError::from(e);
                tracing::warn!(schedule_id, error = %err, "Schedule toggle failed");
                self.notifications
                    .error(format!(
                        "Failed to toggle schedule {schedule_id}: {}",
                        err.user_message()
                    ))
                    .await;
                return Err(err);
            }
        };

        let state = if enabled { "enabled" } else { "disabled" };
        tracing::info!(schedule_id, enabled, "Schedule toggled");
        self.notifications
            .success(format!("Schedule {schedule_id} {state}"))
            .await;

        let _ = self.refresh().await;
        Ok(enabled)
    }

    /// First phase of a delete: produce the confirmation token.
    pub fn request_delete(&self, schedule_id: impl Into<ScheduleId>) -> PendingDelete {
        PendingDelete {
            schedule_id: schedule_id.into(),
        }
    }

    /// Second phase of a delete: send the request.
    pub async fn confirm_delete(&self, pending: PendingDelete) -> ConsoleResult<()> {
        let PendingDelete { schedule_id } = pending;

        if let Err(e) = self.service.delete_schedule(&schedule_id).await {
            tracing::warn!(schedule_id = %schedule_id, error = %e, "Schedule delete failed");
            let message = match e.reason() {
                Some(reason) => format!("Failed to delete schedule {schedule_id}: {reason}"),
                None => format!("Failed to delete schedule {schedule_id}"),
            };
            self.notifications.error(message).await;
            return Err(e.into());
        }

        tracing::info!(schedule_id = %schedule_id, "Schedule deleted");
        self.notifications
            .success(format!("Schedule {schedule_id} deleted"))
            .await;

        let _ = self.refresh().await;
        Ok(())
    }

    /// Show or hide the schedule panel. Returns the new visibility.
    pub fn toggle_panel(&self) -> bool {
        !self.panel_visible.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible.load(Ordering::SeqCst)
    }

    pub async fn schedules(&self) -> Vec<Schedule> {
        self.schedules.read().await.schedules.clone()
    }

    pub async fn schedule(&self, schedule_id: &str) -> Option<Schedule> {
        self.schedules
            .read()
            .await
            .schedules
            .iter()
            .find(|s| s.id == schedule_id)
            .cloned()
    }

    /// The enabled schedule that fires soonest.
    pub async fn next_due(&self) -> Option<Schedule> {
        self.schedules
            .read()
            .await
            .schedules
            .iter()
            .filter(|s| s.enabled)
            .filter_map(|s| s.next_run.map(|at| (at, s)))
            .min_by_key(|(at, _)| *at)
            .map(|(_, s)| s.clone())
    }
}
