//! Transaction routes

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::{created, ok, parse_body, parse_id, AppState};
use crate::error::BudgetError;
use crate::models::TransactionId;
use crate::services::{TransactionInput, TransactionPage, TransactionQuery, TransactionService};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(remove))
}

/// Raw query string; unparseable numbers fall back to defaults
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub department: Option<String>,
}

impl ListParams {
    fn into_query(self, default_limit: usize) -> TransactionQuery {
        let number = |raw: Option<String>| raw.and_then(|s| s.trim().parse::<usize>().ok());
        TransactionQuery {
            page: number(self.page).unwrap_or(1),
            limit: number(self.limit).unwrap_or(default_limit),
            department: self.department.filter(|d| !d.trim().is_empty()),
        }
    }
}

/// Listing response: the page fields sit beside `status`
#[derive(Debug, Serialize)]
struct PageResponse {
    #[serde(flatten)]
    page: TransactionPage,
    status: u16,
}

fn transaction_id(raw: &str) -> Result<TransactionId, BudgetError> {
    parse_id(raw, BudgetError::transaction_not_found)
}

async fn list(State(state): State<AppState>, Query(params): Query<ListParams>) -> ApiResult {
    let query = params.into_query(state.settings.default_page_size);
    let page = state
        .run(move |storage, _| TransactionService::new(storage).list(&query))
        .await?;
    Ok(Json(PageResponse {
        page,
        status: StatusCode::OK.as_u16(),
    })
    .into_response())
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = transaction_id(&id)?;
    let transaction = state
        .run(move |storage, _| TransactionService::new(storage).get(id))
        .await?;
    Ok(ok(transaction))
}

async fn create(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let input: TransactionInput = parse_body(&body)?;
    let view = state
        .run(move |storage, _| TransactionService::new(storage).create(input))
        .await?;
    Ok(created(view))
}

async fn update(State(state): State<AppState>, Path(id): Path<String>, body: Bytes) -> ApiResult {
    let id = transaction_id(&id)?;
    let input: TransactionInput = parse_body(&body)?;
    let view = state
        .run(move |storage, _| TransactionService::new(storage).update(id, input))
        .await?;
    Ok(ok(view))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = transaction_id(&id)?;
    state
        .run(move |storage, _| TransactionService::new(storage).delete(id))
        .await?;
    Ok(ok(()))
}
