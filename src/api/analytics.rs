//! Analytics routes

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use super::error::ApiResult;
use super::{ok, AppState};
use crate::export::{export_budget_analysis_csv, ExportFormat};
use crate::services::AnalyticsService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(summary))
        .route("/export", get(export))
}

async fn summary(State(state): State<AppState>) -> ApiResult {
    let summary = state
        .run(|storage, settings| {
            AnalyticsService::new(storage, settings.currency_symbol.as_str()).summary()
        })
        .await?;
    Ok(ok(summary))
}

/// Budget analysis as a CSV download
async fn export(State(state): State<AppState>) -> ApiResult {
    let summary = state
        .run(|storage, settings| {
            AnalyticsService::new(storage, settings.currency_symbol.as_str()).summary()
        })
        .await?;

    let mut body = Vec::new();
    export_budget_analysis_csv(&summary, &mut body)?;

    Ok((
        [
            (CONTENT_TYPE, ExportFormat::Csv.content_type()),
            (CONTENT_DISPOSITION, "attachment; filename=\"budget-analysis.csv\""),
        ],
        body,
    )
        .into_response())
}
