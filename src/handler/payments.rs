use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::{accounts::PaymentResponse, error_response, rejection_response};
use crate::{
    entities::rates,
    service::payments::{NewRate, PaymentError},
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateRate {
    pub year: String,
    pub price: f32,
}

#[derive(Serialize, ToSchema)]
pub struct RateResponse {
    pub id: i32,
    pub year: String,
    pub price: f32,
}

impl From<rates::Model> for RateResponse {
    fn from(model: rates::Model) -> Self {
        Self {
            id: model.id,
            year: model.year,
            price: model.price,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct RecordPayment {
    pub year: String,
    pub amount: f32,
}

fn payment_error_response(err: &PaymentError) -> Response {
    match err {
        PaymentError::BlankYear => {
            error_response(StatusCode::BAD_REQUEST, "invalid_year", err.to_string())
        }
        PaymentError::RateYearTaken { .. } => {
            error_response(StatusCode::CONFLICT, "rate_year_taken", err.to_string())
        }
        PaymentError::AccountNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "account_not_found", err.to_string())
        }
        PaymentError::RateNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "rate_not_found", err.to_string())
        }
        PaymentError::Storage { .. } => {
            tracing::error!(error = %err, "payments: storage failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", err.to_string())
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/rates",
    tag = "payments",
    request_body = CreateRate,
    responses(
        (status = 201, description = "Created", body = RateResponse),
        (status = 400, description = "Blank year", body = super::ErrorResponse),
        (status = 409, description = "Year already has a rate", body = super::ErrorResponse)
    )
)]
pub async fn create_rate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRate>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let input = NewRate {
        year: payload.year,
        price: payload.price,
    };

    match state.payments().create_rate(input).await {
        Ok(rate) => (StatusCode::CREATED, Json(RateResponse::from(rate))).into_response(),
        Err(err) => payment_error_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/payments",
    tag = "payments",
    request_body = RecordPayment,
    params(
        ("id" = i32, Path, description = "Account id")
    ),
    responses(
        (status = 201, description = "Recorded", body = PaymentResponse),
        (status = 404, description = "Unknown account or year", body = super::ErrorResponse)
    )
)]
pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<RecordPayment>, JsonRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    match state
        .payments()
        .record_payment(id, &payload.year, payload.amount)
        .await
    {
        Ok(record) => (StatusCode::CREATED, Json(PaymentResponse::from(record))).into_response(),
        Err(err) => payment_error_response(&err),
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/rates", post(create_rate))
        .route("/api/v1/accounts/:id/payments", post(record_payment))
        .with_state(state)
}
