//! Web server module.
//!
//! Thin HTTP adapter over the host registry and the result store. All
//! monitoring logic lives in the scheduler and the stores; handlers only
//! translate requests and map errors to status codes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::storage::{HostStore, ResultStore, Window};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub host_store: HostStore,
    pub result_store: ResultStore,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    db: Option<String>,
}

/// Request body for registering a host.
#[derive(Debug, Deserialize)]
pub struct AddHostRequest {
    pub address: String,
}

/// Query parameters for the results API.
#[derive(Debug, Deserialize)]
pub struct ResultsQueryParams {
    pub range: Option<String>,
}

/// Create the axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let app_state = Arc::new(state);

    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .route("/api/hosts", get(list_hosts_handler).post(add_host_handler))
        .route("/api/hosts/{id}", delete(remove_host_handler))
        .route("/api/hosts/{id}/results", get(results_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    tracing::error!(error = %e, "Storage operation failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Liveness probe.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        db: None,
    })
}

/// Readiness probe that checks database availability.
async fn readyz_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.host_store.list().await {
        Ok(_) => Json(HealthResponse {
            status: "ok".to_string(),
            db: Some("ready".to_string()),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "not_ready".to_string(),
                    db: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// List all registered hosts.
async fn list_hosts_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.host_store.list().await {
        Ok(hosts) => Json(hosts).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Register a host address.
///
/// Idempotent: re-adding an existing address returns the existing row with
/// 200 instead of 201.
async fn add_host_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddHostRequest>,
) -> Response {
    let address = body.address.trim();
    if address.is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "address must not be empty",
        );
    }

    match state.host_store.add(address).await {
        Ok((host, created)) => {
            let status = if created {
                tracing::info!(host = %host.address, id = host.id, "Host registered");
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(host)).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// Remove a host and all of its results.
async fn remove_host_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    match state.host_store.remove(id).await {
        Ok(true) => {
            tracing::info!(id, "Host removed");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => error_response(StatusCode::NOT_FOUND, format!("no host with id {id}")),
        Err(e) => internal_error(e),
    }
}

/// Query a host's probe history with summary statistics.
///
/// An absent or unrecognized `range` token means no time filter.
async fn results_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<ResultsQueryParams>,
) -> Response {
    let window = Window::parse(params.range.as_deref());

    match state.result_store.query(id, window).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => internal_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Sample, SqlitePool, init_schema};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use tempfile::{TempDir, tempdir};
    use tower::ServiceExt;

    async fn create_test_state() -> (AppState, TempDir) {
        let dir = tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("server.db").display());
        let pool = SqlitePool::connect(&url).await.unwrap();
        init_schema(&pool).await.unwrap();

        let state = AppState {
            host_store: HostStore::new(pool.clone()),
            result_store: ResultStore::new(pool.clone()),
        };
        (state, dir)
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }

    #[tokio::test]
    async fn test_healthz() {
        let (state, _dir) = create_test_state().await;
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_add_host_created_then_ok() {
        let (state, _dir) = create_test_state().await;
        let app = create_router(state);

        let request = |address: &str| {
            Request::builder()
                .method("POST")
                .uri("/api/hosts")
                .header("content-type", "application/json")
                .body(Body::from(format!(r#"{{"address": "{address}"}}"#)))
                .unwrap()
        };

        let response = app.clone().oneshot(request("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["address"], "10.0.0.1");

        let response = app.oneshot(request("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let existing = json_body(response).await;
        assert_eq!(existing["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_add_host_blank_address() {
        let (state, _dir) = create_test_state().await;
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/hosts")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"address": "   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_remove_host_not_found() {
        let (state, _dir) = create_test_state().await;
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/hosts/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_results_window_filter() {
        let (state, _dir) = create_test_state().await;
        let (host, _) = state.host_store.add("10.0.0.1").await.unwrap();

        let now = Utc::now();
        let sample = Sample {
            latency_ms: Some(5.0),
            success: true,
        };
        state
            .result_store
            .append_at(host.id, now - Duration::hours(25), &sample)
            .await
            .unwrap();
        state
            .result_store
            .append_at(host.id, now - Duration::minutes(1), &sample)
            .await
            .unwrap();

        let app = create_router(state);
        let get_results = |query: &str| {
            Request::builder()
                .uri(format!("/api/hosts/{}/results{query}", host.id))
                .body(Body::empty())
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(get_results("?range=24h"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["results"].as_array().unwrap().len(), 1);

        // Unrecognized token behaves as no filter.
        let response = app.oneshot(get_results("?range=bogus")).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
        assert_eq!(body["avg_latency"], 5.0);
        assert_eq!(body["success_rate"], 1.0);
    }
}
