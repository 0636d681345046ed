//! Contract tests for `ExecutionApi` against an in-process mock of the
//! execution service.
//!
//! Each test binds an axum router on `127.0.0.1:0` and points the client
//! at it, so the real reqwest request/response path is exercised.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use scriptdeck_client::messages::SubmitTaskRequest;
use scriptdeck_client::{ApiError, ExecutionApi, ExecutionService};
use scriptdeck_core::schedule::{ScheduleConfig, Weekday};
use scriptdeck_core::task::TaskStatus;

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
    paths: Arc<Mutex<Vec<String>>>,
}

async fn serve(routes: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().nest("/api", routes);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn mock_service(recorded: Recorded) -> Router {
    Router::new()
        .route("/scripts", get(|| async { Json(json!(["backup", "cleanup"])) }))
        .route(
            "/task-status",
            get(|| async {
                Json(json!([
                    {"id": "t-1", "scripts": ["backup"], "status": "running"},
                    {"id": 2, "scripts": ["cleanup"], "status": "finished"}
                ]))
            }),
        )
        .route("/task-status/{id}", get(task_detail))
        .route("/run-task", post(run_task))
        .route("/stop-task/{id}", post(stop_task))
        .route(
            "/schedules",
            get(|| async {
                Json(json!([{
                    "id": "s-1",
                    "scripts": ["backup"],
                    "frequency": "weekly",
                    "days": ["monday", "friday"],
                    "time": "09:00",
                    "enabled": true,
                    "next_run": "2026-03-06 09:00:00+00:00",
                    "last_run": null
                }]))
            }),
        )
        .route("/schedules/{id}/toggle", post(toggle_schedule))
        .route("/schedules/{id}", delete(delete_schedule))
        .with_state(recorded)
}

async fn task_detail(Path(id): Path<String>) -> Response {
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Task not found"}))).into_response();
    }
    if id == "garbled" {
        return Json(json!({"unexpected": true})).into_response();
    }
    Json(json!({
        "id": id,
        "scripts": ["backup", "cleanup"],
        "status": "running",
        "output": ["starting backup\n", "copied 3 files\n"],
        "current_script": "backup"
    }))
    .into_response()
}

async fn run_task(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded.bodies.lock().unwrap().push(body);
    Json(json!({"task_id": "t-99"}))
}

async fn stop_task(State(recorded): State<Recorded>, Path(id): Path<String>) -> Response {
    recorded.paths.lock().unwrap().push(format!("stop:{id}"));
    if id == "gone" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "No such task"}))).into_response();
    }
    Json(json!({"status": "stopping"})).into_response()
}

async fn toggle_schedule(Path(id): Path<String>) -> Response {
    if id == "broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!({"enabled": false})).into_response()
}

async fn delete_schedule(State(recorded): State<Recorded>, Path(id): Path<String>) -> Response {
    recorded.paths.lock().unwrap().push(format!("delete:{id}"));
    if id == "locked" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"error": "Schedule is currently running"})),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_scripts_returns_catalog() {
    let base = serve(mock_service(Recorded::default())).await;
    let api = ExecutionApi::new(base);

    let scripts = api.list_scripts().await.unwrap();
    assert_eq!(scripts, vec!["backup", "cleanup"]);
}

#[tokio::test]
async fn list_tasks_accepts_mixed_id_types() {
    let base = serve(mock_service(Recorded::default())).await;
    let api = ExecutionApi::new(base);

    let tasks = api.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, "t-1");
    assert_eq!(tasks[1].id, "2");
    assert_eq!(tasks[1].status, TaskStatus::Finished);
}

#[tokio::test]
async fn task_detail_includes_output() {
    let base = serve(mock_service(Recorded::default())).await;
    let api = ExecutionApi::new(base);

    let task = api.task_detail("t-1").await.unwrap();
    assert_eq!(task.id, "t-1");
    assert_eq!(task.status, TaskStatus::Running);
    assert_eq!(task.output.len(), 2);
    assert_eq!(task.current_script.as_deref(), Some("backup"));
}

#[tokio::test]
async fn list_schedules_parses_service_timestamps() {
    let base = serve(mock_service(Recorded::default())).await;
    let api = ExecutionApi::new(base);

    let schedules = api.list_schedules().await.unwrap();
    assert_eq!(schedules.len(), 1);
    let s = &schedules[0];
    assert_eq!(s.describe(), "weekly on monday, friday at 09:00");
    assert!(s.next_run.is_some());
    assert!(s.last_run.is_none());
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn immediate_submit_sends_null_schedule() {
    let recorded = Recorded::default();
    let base = serve(mock_service(recorded.clone())).await;
    let api = ExecutionApi::new(base);

    let req = SubmitTaskRequest::immediate(vec!["backup".into(), "cleanup".into()]);
    let resp = api.submit_task(&req).await.unwrap();
    assert_eq!(resp.task_id.as_deref(), Some("t-99"));

    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(
        bodies[0],
        json!({"scripts": ["backup", "cleanup"], "schedule": null})
    );
}

#[tokio::test]
async fn scheduled_submit_sends_full_config() {
    let recorded = Recorded::default();
    let base = serve(mock_service(recorded.clone())).await;
    let api = ExecutionApi::new(base);

    let config = ScheduleConfig::weekly("09:00".parse().unwrap(), [Weekday::Monday, Weekday::Friday]);
    let req = SubmitTaskRequest::scheduled(vec!["backup".into()], config);
    api.submit_task(&req).await.unwrap();

    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(
        bodies[0]["schedule"],
        json!({"enabled": true, "frequency": "weekly", "time": "09:00", "days": ["monday", "friday"]})
    );
}

#[tokio::test]
async fn stop_and_delete_accept_status_only_responses() {
    let recorded = Recorded::default();
    let base = serve(mock_service(recorded.clone())).await;
    let api = ExecutionApi::new(base);

    api.stop_task("t-1").await.unwrap();
    api.delete_schedule("s-1").await.unwrap();

    let paths = recorded.paths.lock().unwrap();
    assert_eq!(*paths, vec!["stop:t-1", "delete:s-1"]);
}

#[tokio::test]
async fn toggle_returns_new_enabled_flag() {
    let base = serve(mock_service(Recorded::default())).await;
    let api = ExecutionApi::new(base);

    let resp = api.toggle_schedule("s-1").await.unwrap();
    assert!(!resp.enabled);
}

#[tokio::test]
async fn trait_object_dispatches_to_http_client() {
    let base = serve(mock_service(Recorded::default())).await;
    let service: Arc<dyn ExecutionService> = Arc::new(ExecutionApi::new(base));

    let scripts = service.list_scripts().await.unwrap();
    assert_eq!(scripts.len(), 2);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_success_carries_service_reason() {
    let base = serve(mock_service(Recorded::default())).await;
    let api = ExecutionApi::new(base);

    let err = api.task_detail("missing").await.unwrap_err();
    assert_matches!(err, ApiError::Service { status: 404, .. });
    assert_eq!(err.reason(), Some("Task not found"));

    let err = api.delete_schedule("locked").await.unwrap_err();
    assert_eq!(err.reason(), Some("Schedule is currently running"));

    let err = api.stop_task("gone").await.unwrap_err();
    assert_eq!(err.reason(), Some("No such task"));
}

#[tokio::test]
async fn plain_text_error_body_becomes_reason() {
    let base = serve(mock_service(Recorded::default())).await;
    let api = ExecutionApi::new(base);

    let err = api.toggle_schedule("broken").await.unwrap_err();
    assert_matches!(err, ApiError::Service { status: 500, .. });
    assert_eq!(err.reason(), Some("boom"));
}

#[tokio::test]
async fn unexpected_shape_is_malformed() {
    let base = serve(mock_service(Recorded::default())).await;
    let api = ExecutionApi::new(base);

    let err = api.task_detail("garbled").await.unwrap_err();
    assert_matches!(err, ApiError::Malformed(_));
}

#[tokio::test]
async fn unreachable_service_is_transport_failure() {
    // Bind then drop to obtain a port with nothing listening on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ExecutionApi::new(format!("http://{addr}/api"));
    let err = api.list_scripts().await.unwrap_err();
    assert!(err.is_transport());
}
