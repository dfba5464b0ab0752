//! Department routes

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;

use super::error::ApiResult;
use super::{created, ok, parse_body, parse_id, AppState};
use crate::error::BudgetError;
use crate::models::DepartmentId;
use crate::services::{DepartmentInput, DepartmentService};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(remove))
}

fn department_id(raw: &str) -> Result<DepartmentId, BudgetError> {
    parse_id(raw, BudgetError::department_not_found)
}

async fn list(State(state): State<AppState>) -> ApiResult {
    let views = state
        .run(|storage, _| DepartmentService::new(storage).list())
        .await?;
    Ok(ok(views))
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = department_id(&id)?;
    let view = state
        .run(move |storage, _| DepartmentService::new(storage).view(id))
        .await?;
    Ok(ok(view))
}

async fn create(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let input: DepartmentInput = parse_body(&body)?;
    let view = state
        .run(move |storage, _| {
            let service = DepartmentService::new(storage);
            let department = service.create(input)?;
            service.view(department.id)
        })
        .await?;
    Ok(created(view))
}

async fn update(State(state): State<AppState>, Path(id): Path<String>, body: Bytes) -> ApiResult {
    let id = department_id(&id)?;
    let input: DepartmentInput = parse_body(&body)?;
    let view = state
        .run(move |storage, _| {
            let service = DepartmentService::new(storage);
            service.update(id, input)?;
            service.view(id)
        })
        .await?;
    Ok(ok(view))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = department_id(&id)?;
    state
        .run(move |storage, _| DepartmentService::new(storage).delete(id))
        .await?;
    Ok(ok(()))
}
