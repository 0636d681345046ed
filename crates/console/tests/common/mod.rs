//! Shared fixtures for console integration tests.
//!
//! [`FakeService`] is an in-memory execution service. It keeps a small
//! server-side model (tasks, schedules) and lets a test queue scripted
//! responses, hold a response behind a gate, and count calls.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, oneshot, Notify};

use scriptdeck_client::messages::{SubmitResponse, SubmitTaskRequest, ToggleResponse};
use scriptdeck_client::{ApiError, ExecutionService};
use scriptdeck_console::config::ConsoleConfig;
use scriptdeck_console::state::Console;
use scriptdeck_core::notification::Notification;
use scriptdeck_core::schedule::{Frequency, Schedule, ScheduleTime};
use scriptdeck_core::task::{Task, TaskStatus};
use scriptdeck_core::types::ScriptId;

// ---------------------------------------------------------------------------
// Scripted failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Failure {
    Transport,
    Service {
        status: u16,
        reason: Option<&'static str>,
    },
}

impl Failure {
    pub fn service(status: u16, reason: &'static str) -> Self {
        Self::Service {
            status,
            reason: Some(reason),
        }
    }

    fn into_error(self) -> ApiError {
        match self {
            // A request that fails to build is a genuine reqwest::Error.
            Self::Transport => ApiError::Transport(
                reqwest::Client::new()
                    .get("not a url")
                    .build()
                    .unwrap_err(),
            ),
            Self::Service { status, reason } => ApiError::Service {
                status,
                reason: reason.map(str::to_string),
            },
        }
    }
}

/// One queued response, optionally held until the test opens its gate.
pub struct Step<T> {
    result: Result<T, Failure>,
    gate: Option<oneshot::Receiver<()>>,
}

impl<T> Step<T> {
    pub fn ok(value: T) -> Self {
        Self {
            result: Ok(value),
            gate: None,
        }
    }

    pub fn fail(failure: Failure) -> Self {
        Self {
            result: Err(failure),
            gate: None,
        }
    }

    /// Hold this response until the returned sender fires.
    pub fn gated(mut self) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        self.gate = Some(rx);
        (self, tx)
    }

    async fn resolve(self) -> Result<T, ApiError> {
        if let Some(gate) = self.gate {
            let _ = gate.await;
        }
        self.result.map_err(Failure::into_error)
    }
}

// ---------------------------------------------------------------------------
// FakeService
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeService {
    pub catalog: Mutex<Vec<ScriptId>>,
    pub catalog_failure: Mutex<Option<Failure>>,

    /// Served by `list_tasks` when no step is queued.
    pub tasks: Mutex<Vec<Task>>,
    pub task_list_steps: Mutex<VecDeque<Step<Vec<Task>>>>,

    /// Detail responses in order; an empty queue answers 404.
    pub detail_steps: Mutex<VecDeque<Step<Task>>>,

    pub submit_steps: Mutex<VecDeque<Step<SubmitResponse>>>,
    pub submitted: Mutex<Vec<SubmitTaskRequest>>,

    pub stop_failure: Mutex<Option<Failure>>,

    /// Served by `list_schedules`; toggle and delete act on it.
    pub schedules: Mutex<Vec<Schedule>>,
    pub schedule_list_failure: Mutex<Option<Failure>>,
    pub toggle_failure: Mutex<Option<Failure>>,
    pub delete_failure: Mutex<Option<Failure>>,

    calls: Mutex<HashMap<&'static str, usize>>,
    pub detail_started: Notify,
    pub task_list_started: Notify,
    pub submit_started: Notify,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    fn record(&self, name: &'static str) {
        *self.calls.lock().unwrap().entry(name).or_default() += 1;
    }

    pub fn push_detail(&self, step: Step<Task>) {
        self.detail_steps.lock().unwrap().push_back(step);
    }

    pub fn push_task_list(&self, step: Step<Vec<Task>>) {
        self.task_list_steps.lock().unwrap().push_back(step);
    }

    pub fn push_submit(&self, step: Step<SubmitResponse>) {
        self.submit_steps.lock().unwrap().push_back(step);
    }

    pub fn fail_next(slot: &Mutex<Option<Failure>>, failure: Failure) {
        *slot.lock().unwrap() = Some(failure);
    }
}

#[async_trait]
impl ExecutionService for FakeService {
    async fn list_scripts(&self) -> Result<Vec<ScriptId>, ApiError> {
        self.record("list_scripts");
        if let Some(f) = self.catalog_failure.lock().unwrap().clone() {
            return Err(f.into_error());
        }
        Ok(self.catalog.lock().unwrap().clone())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.record("list_tasks");
        self.task_list_started.notify_one();
        let step = self.task_list_steps.lock().unwrap().pop_front();
        match step {
            Some(step) => step.resolve().await,
            None => Ok(self.tasks.lock().unwrap().clone()),
        }
    }

    async fn task_detail(&self, task_id: &str) -> Result<Task, ApiError> {
        self.record("task_detail");
        self.detail_started.notify_one();
        let step = self.detail_steps.lock().unwrap().pop_front();
        match step {
            Some(step) => step.resolve().await,
            None => Err(ApiError::Service {
                status: 404,
                reason: Some(format!("Task {task_id} not found")),
            }),
        }
    }

    async fn submit_task(&self, request: &SubmitTaskRequest) -> Result<SubmitResponse, ApiError> {
        self.record("submit_task");
        self.submitted.lock().unwrap().push(request.clone());
        self.submit_started.notify_one();
        let step = self.submit_steps.lock().unwrap().pop_front();
        match step {
            Some(step) => step.resolve().await,
            None => Ok(SubmitResponse {
                task_id: Some("t-1".into()),
                message: None,
            }),
        }
    }

    async fn stop_task(&self, _task_id: &str) -> Result<(), ApiError> {
        self.record("stop_task");
        match self.stop_failure.lock().unwrap().take() {
            Some(f) => Err(f.into_error()),
            None => Ok(()),
        }
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, ApiError> {
        self.record("list_schedules");
        if let Some(f) = self.schedule_list_failure.lock().unwrap().clone() {
            return Err(f.into_error());
        }
        Ok(self.schedules.lock().unwrap().clone())
    }

    async fn toggle_schedule(&self, schedule_id: &str) -> Result<ToggleResponse, ApiError> {
        self.record("toggle_schedule");
        if let Some(f) = self.toggle_failure.lock().unwrap().take() {
            return Err(f.into_error());
        }
        let mut schedules = self.schedules.lock().unwrap();
        match schedules.iter_mut().find(|s| s.id == schedule_id) {
            Some(s) => {
                s.enabled = !s.enabled;
                Ok(ToggleResponse { enabled: s.enabled })
            }
            None => Err(Failure::service(404, "Schedule not found").into_error()),
        }
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), ApiError> {
        self.record("delete_schedule");
        if let Some(f) = self.delete_failure.lock().unwrap().take() {
            return Err(f.into_error());
        }
        self.schedules.lock().unwrap().retain(|s| s.id != schedule_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn task(id: &str, status: TaskStatus, output: &[&str]) -> Task {
    Task {
        id: id.into(),
        scripts: vec!["backup".into(), "cleanup".into()],
        status,
        output: output.iter().map(|s| s.to_string()).collect(),
        current_script: None,
        started_at: None,
        finished_at: None,
    }
}

pub fn schedule(id: &str, enabled: bool) -> Schedule {
    Schedule {
        id: id.into(),
        scripts: vec!["backup".into()],
        frequency: Frequency::Daily,
        days: BTreeSet::new(),
        time: ScheduleTime::new(9, 0).unwrap(),
        enabled,
        next_run: None,
        last_run: None,
    }
}

/// Fast cadences so chained fetches complete within a test.
pub fn test_config() -> ConsoleConfig {
    ConsoleConfig {
        detail_poll_delay: Duration::from_millis(10),
        task_poll_interval: Duration::from_millis(20),
        schedule_poll_interval: Duration::from_millis(20),
        ..ConsoleConfig::default()
    }
}

pub fn console(fake: &Arc<FakeService>) -> Console {
    Console::new(fake.clone(), test_config())
}

/// Everything published on the notification channel so far.
pub fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}
