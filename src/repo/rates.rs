use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};

use crate::{entities::rates, state::DatabaseClient};

#[async_trait]
pub trait RatesRepo: Send + Sync {
    async fn insert(&self, model: rates::ActiveModel) -> Result<rates::Model, sea_orm::DbErr>;
    async fn find_by_year(&self, year: &str) -> Result<Option<rates::Model>, sea_orm::DbErr>;
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<rates::Model>, sea_orm::DbErr>;
}

pub struct SeaOrmRatesRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmRatesRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RatesRepo for SeaOrmRatesRepo {
    async fn insert(&self, model: rates::ActiveModel) -> Result<rates::Model, sea_orm::DbErr> {
        model.insert(self.db.conn()).await
    }

    async fn find_by_year(&self, year: &str) -> Result<Option<rates::Model>, sea_orm::DbErr> {
        rates::Entity::find()
            .filter(rates::Column::Year.eq(year))
            .filter(rates::Column::DeletedAt.is_null())
            .one(self.db.conn())
            .await
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<rates::Model>, sea_orm::DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Soft-deleted rates stay visible here: old payments still point at them.
        rates::Entity::find()
            .filter(rates::Column::Id.is_in(ids.iter().copied()))
            .all(self.db.conn())
            .await
    }
}
