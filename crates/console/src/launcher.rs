//! Task Launcher: turns the composed sequence into a submission.

use std::sync::Arc;

use scriptdeck_client::messages::SubmitTaskRequest;
use scriptdeck_client::ExecutionService;
use scriptdeck_core::schedule::ScheduleConfig;
use scriptdeck_core::types::{ScriptId, TaskId};

use crate::error::{ConsoleError, ConsoleResult};
use crate::monitor::TaskMonitor;
use crate::notifications::NotificationSink;
use crate::schedules::ScheduleManager;
use crate::sequence::Sequence;

/// A task that started running immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub id: TaskId,
}

/// A recurring schedule the service accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleAck {
    pub config: ScheduleConfig,
    /// Free-form message returned by the service, if any.
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started(TaskHandle),
    Scheduled(ScheduleAck),
}

pub struct TaskLauncher {
    service: Arc<dyn ExecutionService>,
    sequence: Arc<Sequence>,
    monitor: Arc<TaskMonitor>,
    schedules: Arc<ScheduleManager>,
    notifications: Arc<NotificationSink>,
}

impl TaskLauncher {
    pub fn new(
        service: Arc<dyn ExecutionService>,
        sequence: Arc<Sequence>,
        monitor: Arc<TaskMonitor>,
        schedules: Arc<ScheduleManager>,
        notifications: Arc<NotificationSink>,
    ) -> Self {
        Self {
            service,
            sequence,
            monitor,
            schedules,
            notifications,
        }
    }

    /// Submit the current sequence.
    ///
    /// With no schedule, or a disabled one, the task runs immediately and
    /// the detail view follows it. An enabled schedule registers a
    /// recurring job instead. The submitted scripts leave the sequence only
    /// on success.
    pub async fn submit(&self, schedule: Option<ScheduleConfig>) -> ConsoleResult<SubmitOutcome> {
        let scripts = match self.sequence.to_submission().await {
            Ok(scripts) => scripts,
            Err(e) => {
                self.notifications.error(e.to_string()).await;
                return Err(e.into());
            }
        };

        match schedule.filter(|s| s.enabled) {
            None => self.run_now(scripts).await,
            Some(config) => self.register_schedule(scripts, config).await,
        }
    }

    async fn run_now(&self, scripts: Vec<ScriptId>) -> ConsoleResult<SubmitOutcome> {
        let request = SubmitTaskRequest::immediate(scripts);
        let response = match self.service.submit_task(&request).await {
            Ok(resp) => resp,
            Err(e) => return Err(self.submission_failed(e.into()).await),
        };

        let Some(task_id) = response.task_id else {
            return Err(self.submission_failed(ConsoleError::MissingTaskId).await);
        };

        self.sequence.consume_submitted(&request.scripts).await;
        tracing::info!(task_id = %task_id, scripts = request.scripts.len(), "Task started");
        self.notifications
            .success(format!("Task {task_id} started"))
            .await;

        self.monitor.track_detail(task_id.clone()).await;
        let _ = self.monitor.refresh_tasks().await;

        Ok(SubmitOutcome::Started(TaskHandle { id: task_id }))
    }

    async fn register_schedule(
        &self,
        scripts: Vec<ScriptId>,
        config: ScheduleConfig,
    ) -> ConsoleResult<SubmitOutcome> {
        if config.has_empty_week() {
            tracing::warn!("Weekly schedule has no days selected and will never run");
        }

        let request = SubmitTaskRequest::scheduled(scripts, config.clone());
        let response = match self.service.submit_task(&request).await {
            Ok(resp) => resp,
            Err(e) => return Err(self.submission_failed(e.into()).await),
        };

        self.sequence.consume_submitted(&request.scripts).await;
        let cadence = config.describe();
        tracing::info!(cadence = %cadence, scripts = request.scripts.len(), "Schedule created");
        self.notifications.info(format!("Scheduled {cadence}")).await;

        let _ = self.schedules.refresh().await;

        Ok(SubmitOutcome::Scheduled(ScheduleAck {
            config,
            message: response.message,
        }))
    }

    async fn submission_failed(&self, err: ConsoleError) -> ConsoleError {
        tracing::warn!(error = %err, "Task submission failed");
        self.notifications
            .error(format!("Failed to submit task: {}", err.user_message()))
            .await;
        err
    }
}
