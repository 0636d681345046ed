//! HTTP client for the script execution service.
//!
//! Provides typed request/response payloads, a [`reqwest`]-backed REST
//! wrapper, and the [`ExecutionService`](service::ExecutionService) trait
//! the orchestration layer is written against.

pub mod api;
pub mod messages;
pub mod service;

pub use api::{ApiError, ExecutionApi};
pub use service::ExecutionService;
