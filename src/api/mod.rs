//! HTTP API for GlobalBudget
//!
//! JSON over HTTP under `/api`. Successful responses are wrapped as
//! `{ "data": ..., "status": <code> }`; failures as `{ "message", "status" }`.
//! Every route except `/api/health` requires a bearer token.

pub mod analytics;
pub mod auth;
pub mod departments;
pub mod error;
pub mod health;
pub mod reports;
pub mod transactions;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{BudgetError, BudgetResult};
use crate::storage::Storage;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(storage: Arc<Storage>, settings: Settings) -> Self {
        Self {
            storage,
            settings: Arc::new(settings),
        }
    }

    /// Run storage-bound work on the blocking pool
    ///
    /// Every repository call takes locks and may rewrite a JSON file, so
    /// handlers never call the services from an async worker directly.
    pub async fn run<T, F>(&self, op: F) -> BudgetResult<T>
    where
        F: FnOnce(&Storage, &Settings) -> BudgetResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || op(&state.storage, &state.settings))
            .await
            .map_err(|e| BudgetError::Storage(format!("blocking task failed: {}", e)))?
    }
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub status: u16,
}

pub(crate) fn respond<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(Envelope {
            data,
            status: status.as_u16(),
        }),
    )
        .into_response()
}

pub(crate) fn ok<T: Serialize>(data: T) -> Response {
    respond(StatusCode::OK, data)
}

pub(crate) fn created<T: Serialize>(data: T) -> Response {
    respond(StatusCode::CREATED, data)
}

/// Decode a JSON request body; malformed input is a validation error
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> BudgetResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(BudgetError::Validation("Request body is required".into()));
    }
    serde_json::from_slice(body)
        .map_err(|e| BudgetError::Validation(format!("Invalid request body: {}", e)))
}

/// Parse a path id; an id that cannot exist is reported as not found
pub(crate) fn parse_id<T: FromStr>(
    raw: &str,
    not_found: fn(String) -> BudgetError,
) -> BudgetResult<T> {
    raw.parse().map_err(|_| not_found(raw.to_string()))
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/departments", departments::routes())
        .nest("/transactions", transactions::routes())
        .nest("/reports", reports::routes())
        .nest("/analytics", analytics::routes())
        .route_layer(middleware::from_fn(auth::require_bearer));

    let api = Router::new()
        .route("/health", get(health::health))
        .merge(protected);

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Serve the API until Ctrl-C, then flush storage
pub async fn serve(state: AppState, address: &str) -> BudgetResult<()> {
    let listener = TcpListener::bind(address).await?;
    info!(address = %listener.local_addr()?, "server listening");

    let storage = state.storage.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    storage.close()?;
    info!("storage closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DepartmentId;
    use serde_json::Value;

    #[test]
    fn test_parse_body_rejects_empty_and_malformed() {
        let err = parse_body::<Value>(&Bytes::from_static(b"  ")).unwrap_err();
        assert!(err.is_validation());

        let err = parse_body::<Value>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert!(err.is_validation());

        let value: Value = parse_body(&Bytes::from_static(b"{\"a\":1}")).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_parse_id_maps_garbage_to_not_found() {
        let err = parse_id::<DepartmentId>("nope", BudgetError::department_not_found).unwrap_err();
        assert!(err.is_not_found());

        let id = DepartmentId::new();
        let parsed: DepartmentId =
            parse_id(&id.to_string(), BudgetError::department_not_found).unwrap();
        assert_eq!(parsed, id);
    }

    #[tokio::test]
    async fn test_run_returns_service_results_and_errors() {
        use crate::config::BudgetPaths;
        use crate::services::{DepartmentInput, DepartmentService};
        use serde_json::json;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let paths = BudgetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Arc::new(Storage::open(paths).unwrap());
        let state = AppState::new(storage, Settings::default());

        let input = DepartmentInput {
            name: Some(json!("ops")),
            budget: Some(json!(500)),
            ..DepartmentInput::default()
        };
        let department = state
            .run(move |storage, _| DepartmentService::new(storage).create(input))
            .await
            .unwrap();
        assert_eq!(state.storage.departments.get(department.id).unwrap().unwrap().budget, 500);

        let missing = DepartmentId::new();
        let err = state
            .run(move |storage, _| DepartmentService::new(storage).view(missing))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
