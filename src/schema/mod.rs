use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

mod accounts;
mod payments;
mod rates;

/// Creates any missing table and index. Safe to run on every start-up and
/// only uses statements both PostgreSQL and SQLite understand.
pub async fn apply(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let manager = SchemaManager::new(conn);

    accounts::apply(&manager).await?;
    rates::apply(&manager).await?;
    payments::apply(&manager).await?;

    tracing::debug!("schema: up to date");
    Ok(())
}
