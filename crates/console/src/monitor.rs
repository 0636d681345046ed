//! Task Monitor: the polled task list plus one self-repolling detail view.
//!
//! The list is replaced wholesale by each successful fetch. Every fetch
//! takes a request sequence number when it is issued, and a response is
//! only applied if no newer request has already been applied.
//!
//! The detail view is driven by a chain task: fetch, merge, wait, fetch
//! again while the task is active. Each [`TaskMonitor::track_detail`]
//! call starts a new epoch in the [`DetailTracker`]; a response carrying
//! an older epoch is dropped, which is what keeps a late reply from
//! repopulating a closed or retargeted view.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scriptdeck_client::ExecutionService;
use scriptdeck_core::detail::{ApplyOutcome, DetailState, DetailTracker, Epoch};
use scriptdeck_core::task::Task;
use scriptdeck_core::types::TaskId;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ConsoleError, ConsoleResult};
use crate::notifications::NotificationSink;

#[derive(Debug, Default)]
struct TaskList {
    tasks: Vec<Task>,
    applied_seq: u64,
}

/// Handle to the running detail chain.
struct DetailChain {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct TaskMonitor {
    service: Arc<dyn ExecutionService>,
    notifications: Arc<NotificationSink>,
    detail_delay: Duration,
    tasks: RwLock<TaskList>,
    list_seq: AtomicU64,
    detail: Arc<RwLock<DetailTracker>>,
    chain: Mutex<Option<DetailChain>>,
    /// Parent of every chain's cancellation token.
    shutdown: CancellationToken,
}

impl TaskMonitor {
    pub fn new(
        service: Arc<dyn ExecutionService>,
        notifications: Arc<NotificationSink>,
        detail_delay: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            service,
            notifications,
            detail_delay,
            tasks: RwLock::new(TaskList::default()),
            list_seq: AtomicU64::new(0),
            detail: Arc::new(RwLock::new(DetailTracker::new())),
            chain: Mutex::new(None),
            shutdown,
        }
    }

    // -----------------------------------------------------------------------
    // Task list
    // -----------------------------------------------------------------------

    /// Fetch the task list once.
    ///
    /// Returns `Ok(false)` when the response was discarded because a newer
    /// request had already been applied. A failed fetch keeps the cached
    /// list.
    pub async fn refresh_tasks(&self) -> ConsoleResult<bool> {
        let seq = self.list_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let tasks = match self.service.list_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!(error = %e, "Task list poll failed, keeping cached list");
                return Err(e.into());
            }
        };

        let mut list = self.tasks.write().await;
        if seq < list.applied_seq {
            tracing::debug!(seq, applied = list.applied_seq, "Discarding stale task list");
            return Ok(false);
        }
        list.applied_seq = seq;
        list.tasks = tasks;
        Ok(true)
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.tasks.clone()
    }

    /// Look up a task from the last applied list.
    pub async fn task(&self, task_id: &str) -> Option<Task> {
        self.tasks
            .read()
            .await
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Ask the service to stop a task.
    ///
    /// The cached status is not touched; the out-of-cycle refresh that
    /// follows a successful request picks up the real status.
    pub async fn stop(&self, task_id: &str) -> ConsoleResult<()> {
        if let Err(e) = self.service.stop_task(task_id).await {
            let err = ConsoleError::from(e);
            tracing::warn!(task_id, error = %err, "Stop request failed");
            self.notifications
                .error(format!("Failed to stop task {task_id}: {}", err.user_message()))
                .await;
            return Err(err);
        }

        tracing::info!(task_id, "Stop requested");
        self.notifications
            .success(format!("Stop requested for task {task_id}"))
            .await;

        // Polling failures are already logged.
        let _ = self.refresh_tasks().await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Detail view
    // -----------------------------------------------------------------------

    /// Open the detail view on `task_id`, abandoning any previous chain.
    pub async fn track_detail(&self, task_id: impl Into<TaskId>) -> Epoch {
        let task_id = task_id.into();
        let mut chain = self.chain.lock().await;

        if let Some(previous) = chain.take() {
            previous.cancel.cancel();
        }

        let epoch = self.detail.write().await.track(task_id.clone());
        tracing::debug!(task_id = %task_id, epoch, "Tracking task detail");

        let cancel = self.shutdown.child_token();
        let runner = ChainRunner {
            service: Arc::clone(&self.service),
            detail: Arc::clone(&self.detail),
            delay: self.detail_delay,
            task_id,
            epoch,
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(runner.run());
        *chain = Some(DetailChain { cancel, handle });

        epoch
    }

    /// Close the detail view. A response still in flight is discarded.
    pub async fn clear_detail(&self) {
        let chain = self.chain.lock().await;
        self.detail.write().await.clear();
        if let Some(chain) = chain.as_ref() {
            chain.cancel.cancel();
        }
    }

    /// Wait for the current detail chain to end.
    pub async fn join_detail_chain(&self) {
        let chain = self.chain.lock().await.take();
        if let Some(chain) = chain {
            if let Err(e) = chain.handle.await {
                tracing::error!(error = %e, "Detail chain task failed");
            }
        }
    }

    pub async fn detail(&self) -> DetailState {
        self.detail.read().await.state().clone()
    }

    pub async fn detail_task(&self) -> Option<Task> {
        self.detail.read().await.task().cloned()
    }

    /// Output chunks of the detail task from `offset` onwards.
    pub async fn output_since(&self, offset: usize) -> Vec<String> {
        self.detail
            .read()
            .await
            .task()
            .map(|t| t.output_since(offset).to_vec())
            .unwrap_or_default()
    }
}

/// One activation of the detail fetch loop.
struct ChainRunner {
    service: Arc<dyn ExecutionService>,
    detail: Arc<RwLock<DetailTracker>>,
    delay: Duration,
    task_id: TaskId,
    epoch: Epoch,
    cancel: CancellationToken,
}

impl ChainRunner {
    async fn run(self) {
        loop {
            if self.cancel.is_cancelled() {
                return;
            }
            // A joiner may have taken the token, so the epoch is authoritative.
            if !self.detail.read().await.is_current(self.epoch) {
                tracing::debug!(task_id = %self.task_id, epoch = self.epoch, "Detail chain abandoned");
                return;
            }

            // The fetch is not raced against cancellation; a late reply is
            // rejected by the epoch check instead.
            match self.service.task_detail(&self.task_id).await {
                Ok(task) => {
                    let outcome = self.detail.write().await.apply(self.epoch, task);
                    match outcome {
                        ApplyOutcome::Repoll => {}
                        ApplyOutcome::Settled => {
                            tracing::debug!(task_id = %self.task_id, "Task settled, detail polling stopped");
                            return;
                        }
                        ApplyOutcome::Stale => {
                            let err = ConsoleError::StaleResponse {
                                task_id: self.task_id.clone(),
                            };
                            tracing::debug!(epoch = self.epoch, "{err}");
                            return;
                        }
                    }
                }
                Err(e) if e.is_transport() => {
                    if !self.detail.read().await.is_current(self.epoch) {
                        return;
                    }
                    tracing::warn!(task_id = %self.task_id, error = %e, "Detail fetch failed, retrying");
                }
                Err(e) => {
                    tracing::warn!(task_id = %self.task_id, error = %e, "Detail fetch rejected, polling stopped");
                    return;
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
    }
}
