use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use super::{error_response, rejection_response};
use crate::{
    form::{CreateAccountForm, Field, FormError, TracingPresenter},
    service::accounts::{Account, PaymentRecord, SearchQuery, StoreError},
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateAccount {
    #[serde(default)]
    pub garage_number: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
}

/// Only the first filter present is applied, in field order.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccountFilter {
    pub id: Option<i32>,
    pub garage_number: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
}

impl AccountFilter {
    fn into_query(self) -> Option<SearchQuery> {
        if let Some(id) = self.id {
            return Some(SearchQuery::by_id(id));
        }
        self.garage_number
            .map(SearchQuery::by_garage_number)
            .or_else(|| self.full_name.map(SearchQuery::by_full_name))
            .or_else(|| self.phone_number.map(SearchQuery::by_phone_number))
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i32,
    pub year: String,
    pub amount: f32,
    pub rate_price: f32,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(record: PaymentRecord) -> Self {
        Self {
            id: record.payment.id,
            year: record.rate.year,
            amount: record.payment.amount,
            rate_price: record.rate.price,
            created_at: record.payment.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: i32,
    pub garage_number: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub debt: f32,
    pub electricity_number: i32,
    pub last_payed_year: String,
    pub payments: Vec<PaymentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        let last_payed_year = account.last_payed_year().to_string();
        let model = account.account;
        Self {
            id: model.id,
            garage_number: model.garage_number,
            full_name: model.full_name,
            phone_number: model.phone_number,
            address: model.address,
            debt: model.debt,
            electricity_number: model.electricity_number,
            last_payed_year,
            payments: account.payments.into_iter().map(Into::into).collect(),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

pub(crate) fn store_error_response(err: &StoreError) -> Response {
    match err {
        StoreError::NotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        StoreError::GarageNumberTaken { .. } => {
            error_response(StatusCode::CONFLICT, "garage_number_taken", err.to_string())
        }
        _ => {
            tracing::error!(error = %err, "accounts: storage failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", err.to_string())
        }
    }
}

fn form_error_response(err: &FormError) -> Response {
    match err {
        FormError::Invalid(_) => {
            error_response(StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        FormError::Binding { .. } => {
            error_response(StatusCode::BAD_REQUEST, "binding_error", err.to_string())
        }
        FormError::Account(store) => {
            let mut response = store_error_response(store);
            if response.status() != StatusCode::CONFLICT {
                response = error_response(response.status(), "account_error", err.to_string());
            }
            response
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "accounts",
    request_body = CreateAccount,
    responses(
        (status = 201, description = "Created", body = AccountResponse),
        (status = 400, description = "Blank or unreadable field", body = super::ErrorResponse),
        (status = 409, description = "Garage number already taken", body = super::ErrorResponse)
    )
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAccount>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let form = CreateAccountForm::new(state.accounts(), Arc::new(TracingPresenter));
    let filled = [
        (Field::GarageNumber, payload.garage_number),
        (Field::FullName, payload.full_name),
        (Field::PhoneNumber, payload.phone_number),
        (Field::Address, payload.address),
    ]
    .into_iter()
    .try_for_each(|(field, value)| form.fill(field, value));
    if let Err(err) = filled {
        return form_error_response(&err);
    }

    match form.submit().await {
        Ok(account) => {
            (StatusCode::CREATED, Json(AccountResponse::from(account))).into_response()
        }
        Err(err) => form_error_response(&err),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    tag = "accounts",
    params(AccountFilter),
    responses(
        (status = 200, description = "Matching accounts", body = [AccountResponse]),
        (status = 400, description = "Malformed filter", body = super::ErrorResponse)
    )
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<AccountFilter>, QueryRejection>,
) -> Response {
    let Query(filter) = match filter {
        Ok(filter) => filter,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let accounts = state.accounts();
    let result = match filter.into_query() {
        Some(query) => accounts.search(query).await,
        None => accounts.get_all().await,
    };

    match result {
        Ok(found) => {
            let body: Vec<AccountResponse> = found.into_iter().map(Into::into).collect();
            Json(body).into_response()
        }
        Err(err) => store_error_response(&err),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    tag = "accounts",
    params(
        ("id" = i32, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 404, description = "Not found", body = super::ErrorResponse)
    )
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    match state.accounts().find_by_id(id).await {
        Ok(account) => Json(AccountResponse::from(account)).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/accounts", get(list_accounts).post(create_account))
        .route("/api/v1/accounts/:id", get(get_account))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    fn filter(
        id: Option<i32>,
        garage_number: Option<&str>,
        full_name: Option<&str>,
        phone_number: Option<&str>,
    ) -> AccountFilter {
        AccountFilter {
            id,
            garage_number: garage_number.map(str::to_string),
            full_name: full_name.map(str::to_string),
            phone_number: phone_number.map(str::to_string),
        }
    }

    #[test]
    fn empty_filter_means_get_all() {
        assert_eq!(filter(None, None, None, None).into_query(), None);
    }

    #[test]
    fn first_present_filter_wins() {
        assert_eq!(
            filter(Some(3), Some("42"), None, None).into_query(),
            Some(SearchQuery::ById(3))
        );
        assert_eq!(
            filter(None, Some("42"), Some("Ivan"), None).into_query(),
            Some(SearchQuery::ByGarageNumber("42".to_string()))
        );
        assert_eq!(
            filter(None, None, Some("Ivan"), Some("067")).into_query(),
            Some(SearchQuery::ByFullName("Ivan".to_string()))
        );
        assert_eq!(
            filter(None, None, None, Some("067")).into_query(),
            Some(SearchQuery::ByPhoneNumber("067".to_string()))
        );
    }

    #[test]
    fn duplicate_garage_number_maps_to_conflict() {
        let err = FormError::Account(StoreError::GarageNumberTaken {
            garage_number: "42".to_string(),
            source: sea_orm::DbErr::Custom("unique".to_string()),
        });
        assert_eq!(form_error_response(&err).status(), StatusCode::CONFLICT);

        let invalid = FormError::Invalid(Vec::new());
        assert_eq!(form_error_response(&invalid).status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_filter_gets_json_error_body() {
        let uri: Uri = "/api/v1/accounts?id=abc".parse().unwrap();
        let rejection = Query::<AccountFilter>::try_from_uri(&uri).unwrap_err();

        let response = rejection_response(rejection.status(), rejection.body_text());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "invalid_request");
        assert!(json["message"].as_str().unwrap().contains("id"));
    }

    #[test]
    fn well_formed_filter_parses() {
        let uri: Uri = "/api/v1/accounts?garage_number=42".parse().unwrap();
        let Query(filter) = Query::<AccountFilter>::try_from_uri(&uri).unwrap();
        assert_eq!(
            filter.into_query(),
            Some(SearchQuery::ByGarageNumber("42".to_string()))
        );
    }
}
