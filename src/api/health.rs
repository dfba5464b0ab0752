//! Liveness endpoint

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub storage: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        storage: if state.storage.is_initialized() {
            "ready"
        } else {
            "uninitialized"
        },
        timestamp: Utc::now(),
    })
}
