use utoipa::OpenApi;

use crate::handler::{
    self,
    accounts::{AccountResponse, CreateAccount, PaymentResponse},
    health::Health,
    payments::{CreateRate, RateResponse, RecordPayment},
    ErrorResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handler::health::health,
        handler::accounts::create_account,
        handler::accounts::list_accounts,
        handler::accounts::get_account,
        handler::payments::create_rate,
        handler::payments::record_payment
    ),
    components(schemas(
        Health,
        ErrorResponse,
        CreateAccount,
        AccountResponse,
        PaymentResponse,
        CreateRate,
        RateResponse,
        RecordPayment
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "accounts", description = "Garage rental accounts"),
        (name = "payments", description = "Yearly rates and payments")
    )
)]
pub struct ApiDoc;
