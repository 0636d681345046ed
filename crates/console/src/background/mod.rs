//! Periodic refresh loops.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. All loops accept a [`CancellationToken`]
//! for graceful shutdown.

pub mod schedule_poll;
pub mod task_poll;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::state::Console;

/// How long shutdown waits for a poller to notice cancellation.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Join handles of the spawned pollers.
pub struct Pollers {
    cancel: CancellationToken,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

/// Spawn the task-list and schedule pollers for `console`.
pub fn spawn(console: &Console) -> Pollers {
    let cancel = console.shutdown_token();

    let task_handle = tokio::spawn(task_poll::run(
        Arc::clone(&console.monitor),
        console.config.task_poll_interval,
        cancel.clone(),
    ));
    let schedule_handle = tokio::spawn(schedule_poll::run(
        Arc::clone(&console.schedules),
        console.config.schedule_poll_interval,
        cancel.clone(),
    ));

    Pollers {
        cancel,
        handles: vec![("task_poll", task_handle), ("schedule_poll", schedule_handle)],
    }
}

impl Pollers {
    /// Cancel every poller and wait (bounded) for each to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();

        let waits = self.handles.into_iter().map(|(name, handle)| async move {
            match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
                Ok(Ok(())) => tracing::debug!(poller = name, "Poller stopped"),
                Ok(Err(e)) => tracing::error!(poller = name, error = %e, "Poller task failed"),
                Err(_) => tracing::warn!(poller = name, "Poller did not stop in time"),
            }
        });
        futures::future::join_all(waits).await;
    }
}
