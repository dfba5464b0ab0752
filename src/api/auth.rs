//! Bearer token gate
//!
//! Any non-empty token is accepted; verifying it is outside this service.

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::error::BudgetError;

/// Extract the token from an `Authorization` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub async fn require_bearer(req: Request, next: Next) -> Response {
    let authorized = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .is_some();

    if !authorized {
        debug!(path = %req.uri().path(), "rejected request without bearer token");
        return BudgetError::Unauthorized("Missing or invalid bearer token".into()).into_response();
    }

    next.run(req).await
}
