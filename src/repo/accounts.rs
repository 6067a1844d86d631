use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};

use crate::{entities::accounts, state::DatabaseClient};

/// Named account filters. Each one knows how to express itself as a storage
/// condition, so callers never build queries directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchQuery {
    ById(i32),
    ByGarageNumber(String),
    ByFullName(String),
    ByPhoneNumber(String),
}

impl SearchQuery {
    pub fn by_id(id: i32) -> Self {
        Self::ById(id)
    }

    pub fn by_garage_number(value: impl Into<String>) -> Self {
        Self::ByGarageNumber(value.into())
    }

    pub fn by_full_name(value: impl Into<String>) -> Self {
        Self::ByFullName(value.into())
    }

    pub fn by_phone_number(value: impl Into<String>) -> Self {
        Self::ByPhoneNumber(value.into())
    }

    /// Exact match on id, `LIKE '%value%'` on the text columns.
    pub fn condition(&self) -> Condition {
        let expr = match self {
            Self::ById(id) => accounts::Column::Id.eq(*id),
            Self::ByGarageNumber(value) => accounts::Column::GarageNumber.contains(value),
            Self::ByFullName(value) => accounts::Column::FullName.contains(value),
            Self::ByPhoneNumber(value) => accounts::Column::PhoneNumber.contains(value),
        };
        Condition::all().add(expr)
    }
}

#[async_trait]
pub trait AccountsRepo: Send + Sync {
    async fn insert(
        &self,
        model: accounts::ActiveModel,
    ) -> Result<accounts::Model, sea_orm::DbErr>;
    async fn find_by_id(&self, id: i32) -> Result<Option<accounts::Model>, sea_orm::DbErr>;
    async fn search(&self, query: &SearchQuery) -> Result<Vec<accounts::Model>, sea_orm::DbErr>;
    async fn find_all(&self) -> Result<Vec<accounts::Model>, sea_orm::DbErr>;
}

pub struct SeaOrmAccountsRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmAccountsRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    fn live() -> sea_orm::Select<accounts::Entity> {
        accounts::Entity::find()
            .filter(accounts::Column::DeletedAt.is_null())
            .order_by_asc(accounts::Column::Id)
    }
}

#[async_trait]
impl AccountsRepo for SeaOrmAccountsRepo {
    async fn insert(
        &self,
        model: accounts::ActiveModel,
    ) -> Result<accounts::Model, sea_orm::DbErr> {
        model.insert(self.db.conn()).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<accounts::Model>, sea_orm::DbErr> {
        Self::live()
            .filter(accounts::Column::Id.eq(id))
            .one(self.db.conn())
            .await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<accounts::Model>, sea_orm::DbErr> {
        tracing::debug!(?query, "accounts: search");
        Self::live()
            .filter(query.condition())
            .all(self.db.conn())
            .await
    }

    async fn find_all(&self) -> Result<Vec<accounts::Model>, sea_orm::DbErr> {
        Self::live().all(self.db.conn()).await
    }
}
