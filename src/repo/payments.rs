use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{entities::payments, state::DatabaseClient};

#[async_trait]
pub trait PaymentsRepo: Send + Sync {
    async fn insert(
        &self,
        model: payments::ActiveModel,
    ) -> Result<payments::Model, sea_orm::DbErr>;
    /// Live payments of the given accounts, oldest first.
    async fn find_by_account_ids(
        &self,
        account_ids: &[i32],
    ) -> Result<Vec<payments::Model>, sea_orm::DbErr>;
}

pub struct SeaOrmPaymentsRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmPaymentsRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentsRepo for SeaOrmPaymentsRepo {
    async fn insert(
        &self,
        model: payments::ActiveModel,
    ) -> Result<payments::Model, sea_orm::DbErr> {
        model.insert(self.db.conn()).await
    }

    async fn find_by_account_ids(
        &self,
        account_ids: &[i32],
    ) -> Result<Vec<payments::Model>, sea_orm::DbErr> {
        if account_ids.is_empty() {
            return Ok(Vec::new());
        }

        payments::Entity::find()
            .filter(payments::Column::AccountId.is_in(account_ids.iter().copied()))
            .filter(payments::Column::DeletedAt.is_null())
            .order_by_asc(payments::Column::Id)
            .all(self.db.conn())
            .await
    }
}
