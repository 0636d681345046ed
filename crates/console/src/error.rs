use scriptdeck_client::ApiError;
use scriptdeck_core::error::CoreError;
use scriptdeck_core::types::TaskId;

/// Errors surfaced by the orchestration layer.
///
/// Wraps [`CoreError`] for local validation failures and [`ApiError`] for
/// failures talking to the execution service.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The script catalog could not be fetched; the cached list is kept.
    #[error("Script catalog unavailable: {0}")]
    CatalogUnavailable(#[source] ApiError),

    /// A response arrived for a detail activation that is no longer current.
    #[error("Discarded stale response for task {task_id}")]
    StaleResponse { task_id: TaskId },

    /// An immediate submission was accepted but no task id came back.
    #[error("Execution service accepted the task but returned no task id")]
    MissingTaskId,
}

impl ConsoleError {
    /// Text suitable for a user-facing notification.
    ///
    /// Service errors prefer the reason the service gave.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Service {
                reason: Some(reason),
                ..
            }) => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Convenience alias for orchestration results.
pub type ConsoleResult<T> = Result<T, ConsoleError>;
