use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DbErr, Set};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    entities::{payments, rates},
    repo::{accounts::AccountsRepo, payments::PaymentsRepo, rates::RatesRepo},
    service::{accounts::PaymentRecord, is_unique_violation},
};

#[derive(Clone, Debug, PartialEq)]
pub struct NewRate {
    pub year: String,
    pub price: f32,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("cannot create rate: year must not be blank")]
    BlankYear,
    #[error("cannot create rate: year \"{year}\" already exists")]
    RateYearTaken {
        year: String,
        #[source]
        source: DbErr,
    },
    #[error("account {0} not found")]
    AccountNotFound(i32),
    #[error("no rate for year \"{0}\"")]
    RateNotFound(String),
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: DbErr,
    },
}

impl PaymentError {
    fn storage(context: &'static str) -> impl FnOnce(DbErr) -> Self {
        move |source| Self::Storage { context, source }
    }
}

#[async_trait]
pub trait PaymentsService: Send + Sync {
    async fn create_rate(&self, input: NewRate) -> Result<rates::Model, PaymentError>;
    /// Appends a payment for `account_id` against the rate of `year`.
    async fn record_payment(
        &self,
        account_id: i32,
        year: &str,
        amount: f32,
    ) -> Result<PaymentRecord, PaymentError>;
}

pub struct PaymentsServiceImpl {
    accounts_repo: Arc<dyn AccountsRepo>,
    payments_repo: Arc<dyn PaymentsRepo>,
    rates_repo: Arc<dyn RatesRepo>,
}

impl PaymentsServiceImpl {
    pub fn new(
        accounts_repo: Arc<dyn AccountsRepo>,
        payments_repo: Arc<dyn PaymentsRepo>,
        rates_repo: Arc<dyn RatesRepo>,
    ) -> Self {
        Self {
            accounts_repo,
            payments_repo,
            rates_repo,
        }
    }
}

#[async_trait]
impl PaymentsService for PaymentsServiceImpl {
    async fn create_rate(&self, input: NewRate) -> Result<rates::Model, PaymentError> {
        let year = input.year.trim().to_string();
        if year.is_empty() {
            return Err(PaymentError::BlankYear);
        }

        let now = Utc::now();
        let model = rates::ActiveModel {
            year: Set(year.clone()),
            price: Set(input.price),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
            ..Default::default()
        };

        match self.rates_repo.insert(model).await {
            Ok(rate) => {
                tracing::info!(
                    id = rate.id,
                    year = %rate.year,
                    price = rate.price,
                    "rates: created"
                );
                Ok(rate)
            }
            Err(source) if is_unique_violation(&source) => {
                Err(PaymentError::RateYearTaken { year, source })
            }
            Err(source) => Err(PaymentError::Storage {
                context: "cannot create rate",
                source,
            }),
        }
    }

    async fn record_payment(
        &self,
        account_id: i32,
        year: &str,
        amount: f32,
    ) -> Result<PaymentRecord, PaymentError> {
        self.accounts_repo
            .find_by_id(account_id)
            .await
            .map_err(PaymentError::storage("cannot find account"))?
            .ok_or(PaymentError::AccountNotFound(account_id))?;

        let rate = self
            .rates_repo
            .find_by_year(year.trim())
            .await
            .map_err(PaymentError::storage("cannot find rate"))?
            .ok_or_else(|| PaymentError::RateNotFound(year.to_string()))?;

        let now = Utc::now();
        let model = payments::ActiveModel {
            account_id: Set(account_id),
            rate_id: Set(rate.id),
            amount: Set(amount),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
            ..Default::default()
        };
        let payment = self
            .payments_repo
            .insert(model)
            .await
            .map_err(PaymentError::storage("cannot create payment record"))?;

        tracing::info!(
            id = payment.id,
            account_id,
            year = %rate.year,
            amount,
            "payments: recorded"
        );
        Ok(PaymentRecord { payment, rate })
    }
}
