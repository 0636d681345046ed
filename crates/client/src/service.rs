//! The execution-service seam.
//!
//! The orchestration layer only talks to [`ExecutionService`], so it can
//! run against the real HTTP client or an in-memory double.

use async_trait::async_trait;
use scriptdeck_core::schedule::Schedule;
use scriptdeck_core::task::Task;
use scriptdeck_core::types::ScriptId;

use crate::api::{ApiError, ExecutionApi};
use crate::messages::{SubmitResponse, SubmitTaskRequest, ToggleResponse};

/// Operations the control surface consumes from the execution service.
#[async_trait]
pub trait ExecutionService: Send + Sync {
    async fn list_scripts(&self) -> Result<Vec<ScriptId>, ApiError>;

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;

    async fn task_detail(&self, task_id: &str) -> Result<Task, ApiError>;

    async fn submit_task(&self, request: &SubmitTaskRequest) -> Result<SubmitResponse, ApiError>;

    async fn stop_task(&self, task_id: &str) -> Result<(), ApiError>;

    async fn list_schedules(&self) -> Result<Vec<Schedule>, ApiError>;

    async fn toggle_schedule(&self, schedule_id: &str) -> Result<ToggleResponse, ApiError>;

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ExecutionService for ExecutionApi {
    async fn list_scripts(&self) -> Result<Vec<ScriptId>, ApiError> {
        ExecutionApi::list_scripts(self).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        ExecutionApi::list_tasks(self).await
    }

    async fn task_detail(&self, task_id: &str) -> Result<Task, ApiError> {
        ExecutionApi::task_detail(self, task_id).await
    }

    async fn submit_task(&self, request: &SubmitTaskRequest) -> Result<SubmitResponse, ApiError> {
        ExecutionApi::submit_task(self, request).await
    }

    async fn stop_task(&self, task_id: &str) -> Result<(), ApiError> {
        ExecutionApi::stop_task(self, task_id).await
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, ApiError> {
        ExecutionApi::list_schedules(self).await
    }

    async fn toggle_schedule(&self, schedule_id: &str) -> Result<ToggleResponse, ApiError> {
        ExecutionApi::toggle_schedule(self, schedule_id).await
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), ApiError> {
        ExecutionApi::delete_schedule(self, schedule_id).await
    }
}
