//! Task records as reported by the execution service.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{deserialize_id, deserialize_timestamp, ScriptId, TaskId, Timestamp};

/// Lifecycle status of a submitted task.
///
/// `Starting` and `Running` are the only non-terminal states; a task in
/// either one keeps its detail subscription polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Starting,
    Running,
    Finished,
    Error,
    Stopped,
}

impl TaskStatus {
    /// Whether the task may still produce output or change status.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Error => "error",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted execution of a script sequence.
///
/// List responses usually omit `output`; the detail endpoint fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: TaskId,
    #[serde(default)]
    pub scripts: Vec<ScriptId>,
    pub status: TaskStatus,
    /// Text chunks in emission order.
    #[serde(default)]
    pub output: Vec<String>,
    /// Script currently executing, when the service reports it.
    #[serde(default)]
    pub current_script: Option<ScriptId>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub started_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub finished_at: Option<Timestamp>,
}

impl Task {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Fold a freshly fetched record for the same task into `self`.
    ///
    /// Everything except `output` is replaced wholesale. Output only ever
    /// grows: chunks already held are never dropped or reordered, and only
    /// chunks past the current length are appended. Returns the number of
    /// chunks appended.
    pub fn merge_fetched(&mut self, fetched: Task) -> usize {
        let Task {
            id,
            scripts,
            status,
            output,
            current_script,
            started_at,
            finished_at,
        } = fetched;

        debug_assert_eq!(self.id, id, "merge_fetched called across tasks");

        let held = self.output.len();
        if output.len() < held || output[..held] != self.output[..] {
            tracing::debug!(
                task_id = %self.id,
                held,
                fetched = output.len(),
                "Fetched output is not an extension of held output",
            );
        }
        let appended = output.len().saturating_sub(held);
        self.output.extend(output.into_iter().skip(held));

        self.scripts = scripts;
        self.status = status;
        self.current_script = current_script;
        self.started_at = started_at;
        self.finished_at = finished_at;

        appended
    }

    /// Output chunks from `offset` onwards, for incremental tailing.
    pub fn output_since(&self, offset: usize) -> &[String] {
        self.output.get(offset..).unwrap_or(&[])
    }
}
