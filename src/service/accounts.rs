use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DbErr, Set};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

pub use crate::repo::accounts::SearchQuery;
use crate::{
    entities::{accounts, payments, rates},
    repo::{accounts::AccountsRepo, payments::PaymentsRepo, rates::RatesRepo},
    service::is_unique_violation,
};

pub const NO_PAYMENTS: &str = "No payments";

#[derive(Clone, Debug, PartialEq)]
pub struct PaymentRecord {
    pub payment: payments::Model,
    pub rate: rates::Model,
}

/// An account row together with its payments, oldest first.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub account: accounts::Model,
    pub payments: Vec<PaymentRecord>,
}

impl Account {
    /// Year of the rate behind the most recent payment.
    pub fn last_payed_year(&self) -> &str {
        self.payments
            .last()
            .map(|record| record.rate.year.as_str())
            .unwrap_or(NO_PAYMENTS)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewAccount {
    pub garage_number: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub debt: f32,
    pub electricity_number: i32,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot find accounts: {0}")]
    Search(#[source] DbErr),
    #[error("cannot load accounts: {0}")]
    Load(#[source] DbErr),
    #[error("cannot find account {id}: {source}")]
    Find {
        id: i32,
        #[source]
        source: DbErr,
    },
    #[error("account {0} not found")]
    NotFound(i32),
    #[error("cannot create account record: garage number \"{garage_number}\" already exists")]
    GarageNumberTaken {
        garage_number: String,
        #[source]
        source: DbErr,
    },
    #[error("cannot create account record: {0}")]
    Create(#[source] DbErr),
}

#[async_trait]
pub trait AccountsService: Send + Sync {
    async fn search(&self, query: SearchQuery) -> Result<Vec<Account>, StoreError>;
    async fn get_all(&self) -> Result<Vec<Account>, StoreError>;
    async fn find_by_id(&self, id: i32) -> Result<Account, StoreError>;
    async fn insert(&self, input: NewAccount) -> Result<Account, StoreError>;
}

pub struct AccountsServiceImpl {
    accounts_repo: Arc<dyn AccountsRepo>,
    payments_repo: Arc<dyn PaymentsRepo>,
    rates_repo: Arc<dyn RatesRepo>,
}

impl AccountsServiceImpl {
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

    /// Attaches payments and their rates with one query per table.
    async fn preload(&self, models: Vec<accounts::Model>) -> Result<Vec<Account>, DbErr> {
        let account_ids: Vec<i32> = models.iter().map(|model| model.id).collect();
        let payments = self.payments_repo.find_by_account_ids(&account_ids).await?;

        let mut rate_ids: Vec<i32> = payments.iter().map(|payment| payment.rate_id).collect();
        rate_ids.sort_unstable();
        rate_ids.dedup();
        let rates: HashMap<i32, rates::Model> = self
            .rates_repo
            .find_by_ids(&rate_ids)
            .await?
            .into_iter()
            .map(|rate| (rate.id, rate))
            .collect();

        let mut by_account: HashMap<i32, Vec<PaymentRecord>> = HashMap::new();
        for payment in payments {
            let rate = rates.get(&payment.rate_id).cloned().ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "rate {} referenced by payment {}",
                    payment.rate_id, payment.id
                ))
            })?;
            by_account
                .entry(payment.account_id)
                .or_default()
                .push(PaymentRecord { payment, rate });
        }

        Ok(models
            .into_iter()
            .map(|account| {
                let payments = by_account.remove(&account.id).unwrap_or_default();
                Account { account, payments }
            })
            .collect())
    }
}

#[async_trait]
impl AccountsService for AccountsServiceImpl {
    async fn search(&self, query: SearchQuery) -> Result<Vec<Account>, StoreError> {
        let models = self
            .accounts_repo
            .search(&query)
            .await
            .map_err(StoreError::Search)?;
        self.preload(models).await.map_err(StoreError::Search)
    }

    async fn get_all(&self) -> Result<Vec<Account>, StoreError> {
        let models = self.accounts_repo.find_all().await.map_err(StoreError::Load)?;
        self.preload(models).await.map_err(StoreError::Load)
    }

    async fn find_by_id(&self, id: i32) -> Result<Account, StoreError> {
        let model = self
            .accounts_repo
            .find_by_id(id)
            .await
            .map_err(|source| StoreError::Find { id, source })?
            .ok_or(StoreError::NotFound(id))?;

        let mut loaded = self
            .preload(vec![model])
            .await
            .map_err(|source| StoreError::Find { id, source })?;
        loaded.pop().ok_or(StoreError::NotFound(id))
    }

    async fn insert(&self, input: NewAccount) -> Result<Account, StoreError> {
        if input.garage_number.trim().is_empty() {
            return Err(StoreError::Create(DbErr::Custom(
                "garage number must not be blank".to_string(),
            )));
        }
        if input.full_name.trim().is_empty() {
            return Err(StoreError::Create(DbErr::Custom(
                "full name must not be blank".to_string(),
            )));
        }

        let now = Utc::now();
        let model = accounts::ActiveModel {
            garage_number: Set(input.garage_number.clone()),
            full_name: Set(input.full_name),
            phone_number: Set(input.phone_number),
            address: Set(input.address),
            debt: Set(input.debt),
            electricity_number: Set(input.electricity_number),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
            ..Default::default()
        };

        match self.accounts_repo.insert(model).await {
            Ok(account) => {
                tracing::info!(
                    id = account.id,
                    garage_number = %account.garage_number,
                    "accounts: created"
                );
                Ok(Account {
                    account,
                    payments: Vec::new(),
                })
            }
            Err(source) if is_unique_violation(&source) => Err(StoreError::GarageNumberTaken {
                garage_number: input.garage_number,
                source,
            }),
            Err(source) => Err(StoreError::Create(source)),
        }
    }
}
