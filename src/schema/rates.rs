use sea_orm_migration::prelude::*;

pub async fn apply(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    if !manager.has_table("rates").await? {
        manager
            .create_table(
                Table::create()
                    .table(Rates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rates::Year).string().not_null())
                    .col(ColumnDef::new(Rates::Price).float().not_null())
                    .col(
                        ColumnDef::new(Rates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rates::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rates_year")
                    .table(Rates::Table)
                    .col(Rates::Year)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum Rates {
    Table,
    Id,
    Year,
    Price,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
