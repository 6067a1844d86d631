use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;

use crate::{
    repo::{accounts::SeaOrmAccountsRepo, payments::SeaOrmPaymentsRepo, rates::SeaOrmRatesRepo},
    service::{
        accounts::{AccountsService, AccountsServiceImpl},
        config::ConfigService,
        payments::{PaymentsService, PaymentsServiceImpl},
    },
};

pub trait DatabaseClient: Send + Sync {
    fn conn(&self) -> &DatabaseConnection;
}

pub struct SeaOrmDatabaseClient {
    conn: DatabaseConnection,
}

impl SeaOrmDatabaseClient {
    /// Connects and brings the schema up to date.
    pub async fn connect(url: &str) -> Result<Self, DbErr> {
        let conn = crate::db::connect(url).await?;
        crate::schema::apply(&conn).await?;
        Ok(Self { conn })
    }
}

impl DatabaseClient for SeaOrmDatabaseClient {
    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

pub struct AppState {
    accounts: Arc<dyn AccountsService>,
    payments: Arc<dyn PaymentsService>,
    config: Arc<dyn ConfigService>,
}

impl AppState {
    pub async fn new(config: Arc<dyn ConfigService>) -> Result<Arc<Self>, DbErr> {
        let db = Arc::new(SeaOrmDatabaseClient::connect(&config.values().database_url).await?);
        Ok(Self::with_database(db, config))
    }

    pub fn with_database(db: Arc<dyn DatabaseClient>, config: Arc<dyn ConfigService>) -> Arc<Self> {
        let accounts_repo = Arc::new(SeaOrmAccountsRepo::new(db.clone()));
        let payments_repo = Arc::new(SeaOrmPaymentsRepo::new(db.clone()));
        let rates_repo = Arc::new(SeaOrmRatesRepo::new(db));

        let accounts = Arc::new(AccountsServiceImpl::new(
            accounts_repo.clone(),
            payments_repo.clone(),
            rates_repo.clone(),
        ));
        let payments = Arc::new(PaymentsServiceImpl::new(
            accounts_repo,
            payments_repo,
            rates_repo,
        ));

        Arc::new(Self {
            accounts,
            payments,
            config,
        })
    }

    pub fn accounts(&self) -> Arc<dyn AccountsService> {
        self.accounts.clone()
    }

    pub fn payments(&self) -> &dyn PaymentsService {
        self.payments.as_ref()
    }

    pub fn config(&self) -> &dyn ConfigService {
        self.config.as_ref()
    }
}
