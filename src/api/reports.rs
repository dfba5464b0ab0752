//! Report routes

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use super::error::ApiResult;
use super::{ok, parse_body, parse_id, AppState};
use crate::error::BudgetError;
use crate::export::{export_report, ExportFormat};
use crate::models::ReportId;
use crate::reports::ReportGenerator;
use crate::storage::ReportStore;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(generate))
        .route("/:id", get(show))
        .route("/:id/export", get(export))
}

/// `POST /api/reports` body
#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(rename = "type", default)]
    report_type: Option<Value>,
    #[serde(default)]
    parameters: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportParams {
    format: Option<String>,
}

fn report_id(raw: &str) -> Result<ReportId, BudgetError> {
    parse_id(raw, BudgetError::report_not_found)
}

async fn generate(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let request: GenerateRequest = parse_body(&body)?;
    let report_type = match request.report_type {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        _ => return Err(BudgetError::Validation("type is required".into())),
    };

    let parameters = request.parameters;
    let report = state
        .run(move |storage, _| ReportGenerator::new(storage).generate(&report_type, parameters))
        .await?;
    Ok(ok(report))
}

async fn list(State(state): State<AppState>) -> ApiResult {
    let reports = state.run(|storage, _| storage.reports.list()).await?;
    Ok(ok(reports))
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = report_id(&id)?;
    let report = state.run(move |storage, _| storage.reports.get(id)).await?;
    Ok(ok(report))
}

async fn export(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ExportParams>,
) -> ApiResult {
    let format: ExportFormat = match params.format.as_deref() {
        Some(raw) => raw.parse()?,
        None => ExportFormat::default(),
    };
    let id = report_id(&id)?;
    let report = state.run(move |storage, _| storage.reports.get(id)).await?;

    let mut body = Vec::new();
    export_report(&report, format, &mut body)?;

    let disposition = format!(
        "attachment; filename=\"report-{}.{}\"",
        report.id.short(),
        format.extension()
    );
    Ok((
        [
            (CONTENT_TYPE, format.content_type().to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
