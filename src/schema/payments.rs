use sea_orm_migration::prelude::*;

pub async fn apply(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    if !manager.has_table("payments").await? {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::AccountId).integer().not_null())
                    .col(ColumnDef::new(Payments::RateId).integer().not_null())
                    .col(ColumnDef::new(Payments::Amount).float().not_null())
                    .col(
                        ColumnDef::new(Payments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_account_id")
                            .from(Payments::Table, Payments::AccountId)
                            .to(Alias::new("accounts"), Alias::new("id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_rate_id")
                            .from(Payments::Table, Payments::RateId)
                            .to(Alias::new("rates"), Alias::new("id")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_account_id")
                    .table(Payments::Table)
                    .col(Payments::AccountId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    AccountId,
    RateId,
    Amount,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
