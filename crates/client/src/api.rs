//! REST API client for the execution service HTTP endpoints.
//!
//! Wraps catalog listing, task submission, task status, cancellation,
//! and schedule management using [`reqwest`].

use reqwest::{Method, Url};
use scriptdeck_core::schedule::Schedule;
use scriptdeck_core::task::Task;
use scriptdeck_core::types::ScriptId;
use serde::de::DeserializeOwned;

use crate::messages::{error_reason, SubmitResponse, SubmitTaskRequest, ToggleResponse};

/// HTTP client for a single execution service instance.
#[derive(Debug, Clone)]
pub struct ExecutionApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the execution service REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Execution service error ({status}): {}", .reason.as_deref().unwrap_or("no reason given"))]
    Service {
        /// HTTP status code.
        status: u16,
        /// Reason extracted from the response body, if any.
        reason: Option<String>,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The configured base URL cannot be joined with an endpoint path.
    #[error("Invalid base URL '{0}'")]
    InvalidUrl(String),
}

impl ApiError {
    /// The structured reason carried by a service error, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Service { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    /// Whether the failure happened below HTTP (no status was received).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl ExecutionApi {
    /// Create a new API client for an execution service.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://localhost:5001/api`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (e.g. one built with a request timeout).
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// `GET /scripts`
    pub async fn list_scripts(&self) -> Result<Vec<ScriptId>, ApiError> {
        self.fetch_json(Method::GET, &["scripts"]).await
    }

    /// `GET /task-status`
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.fetch_json(Method::GET, &["task-status"]).await
    }

    /// `GET /task-status/{id}` -- the full record including output.
    pub async fn task_detail(&self, task_id: &str) -> Result<Task, ApiError> {
        self.fetch_json(Method::GET, &["task-status", task_id]).await
    }

    /// `POST /run-task`
    pub async fn submit_task(
        &self,
        request: &SubmitTaskRequest,
    ) -> Result<SubmitResponse, ApiError> {
        let url = self.endpoint(&["run-task"])?;
        tracing::debug!(
            scripts = request.scripts.len(),
            scheduled = request.is_scheduled(),
            "Submitting task",
        );
        let response = self.client.post(url).json(request).send().await?;
        Self::parse_response(response).await
    }

    /// `POST /stop-task/{id}`
    pub async fn stop_task(&self, task_id: &str) -> Result<(), ApiError> {
        self.send_expecting_status(Method::POST, &["stop-task", task_id])
            .await
    }

    /// `GET /schedules`
    pub async fn list_schedules(&self) -> Result<Vec<Schedule>, ApiError> {
        self.fetch_json(Method::GET, &["schedules"]).await
    }

    /// `POST /schedules/{id}/toggle`
    pub async fn toggle_schedule(&self, schedule_id: &str) -> Result<ToggleResponse, ApiError> {
        self.fetch_json(Method::POST, &["schedules", schedule_id, "toggle"])
            .await
    }

    /// `DELETE /schedules/{id}`
    pub async fn delete_schedule(&self, schedule_id: &str) -> Result<(), ApiError> {
        self.send_expecting_status(Method::DELETE, &["schedules", schedule_id])
            .await
    }

    // ---- private helpers ----

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url =
            Url::parse(&self.api_url).map_err(|_| ApiError::InvalidUrl(self.api_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let response = self.client.request(method, url).send().await?;
        Self::parse_response(response).await
    }

    async fn send_expecting_status(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        let response = self.client.request(method, url).send().await?;
        Self::check_status(response).await
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Service`]
    /// carrying the status and extracted reason on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Service {
                status: status.as_u16(),
                reason: error_reason(&body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    ///
    /// The body is read as text first so that shape mismatches surface as
    /// [`ApiError::Malformed`] rather than as transport failures.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
