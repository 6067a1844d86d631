use sea_orm_migration::prelude::*;

pub async fn apply(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    if !manager.has_table("accounts").await? {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::GarageNumber)
                            .string()
                            .not_null()
                            .check(Expr::col(Accounts::GarageNumber).ne("")),
                    )
                    .col(
                        ColumnDef::new(Accounts::FullName)
                            .string()
                            .not_null()
                            .check(Expr::col(Accounts::FullName).ne("")),
                    )
                    .col(ColumnDef::new(Accounts::PhoneNumber).string())
                    .col(ColumnDef::new(Accounts::Address).string())
                    .col(
                        ColumnDef::new(Accounts::Debt)
                            .float()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Accounts::ElectricityNumber)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Accounts::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_garage_number")
                    .table(Accounts::Table)
                    .col(Accounts::GarageNumber)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    GarageNumber,
    FullName,
    PhoneNumber,
    Address,
    Debt,
    ElectricityNumber,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
