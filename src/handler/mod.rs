use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

pub mod accounts;
pub mod health;
pub mod payments;

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

pub(crate) fn error_response(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        Json(ErrorResponse {
            code: code.to_string(),
            message: message.into(),
        }),
    )
        .into_response()
}

/// Extractor rejections (bad query, path or body) use the same error body.
pub(crate) fn rejection_response(status: StatusCode, message: String) -> Response {
    error_response(status, "invalid_request", message)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes(state.clone()))
        .merge(payments::routes(state))
}
