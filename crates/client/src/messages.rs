//! Wire payloads exchanged with the execution service that are not
//! domain records themselves.

use serde::{Deserialize, Serialize};
use scriptdeck_core::schedule::ScheduleConfig;
use scriptdeck_core::types::{deserialize_optional_id, ScriptId, TaskId};

/// Body of `POST /run-task`.
///
/// `schedule` is serialized as `null` for an immediate run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitTaskRequest {
    pub scripts: Vec<ScriptId>,
    pub schedule: Option<ScheduleConfig>,
}

impl SubmitTaskRequest {
    pub fn immediate(scripts: Vec<ScriptId>) -> Self {
        Self {
            scripts,
            schedule: None,
        }
    }

    pub fn scheduled(scripts: Vec<ScriptId>, schedule: ScheduleConfig) -> Self {
        Self {
            scripts,
            schedule: Some(schedule),
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.schedule.as_ref().is_some_and(|s| s.enabled)
    }
}

/// Response of `POST /run-task`.
///
/// Immediate runs always carry `task_id`; scheduled submissions may omit
/// it because nothing runs yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub task_id: Option<TaskId>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `POST /schedules/{id}/toggle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ToggleResponse {
    /// The schedule's `enabled` flag after the flip.
    pub enabled: bool,
}

/// Extract a human-readable reason from a non-success response body.
///
/// The service reports failures as `{"error": ...}`; `message` and
/// `detail` are accepted as fallbacks. Non-JSON bodies are used verbatim
/// when short and non-empty.
pub fn error_reason(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        return ["error", "message", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .map(str::to_string);
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.len() > 200 {
        None
    } else {
        Some(trimmed.to_string())
    }
}
