use civicly_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250401_000001_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(user::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(user::Column::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(user::Column::WalletAddress).string().not_null())
                    .col(
                        ColumnDef::new(user::Column::Network)
                            .string()
                            .not_null()
                            .default("solana"),
                    )
                    .col(ColumnDef::new(user::Column::Email).string())
                    .col(
                        ColumnDef::new(user::Column::Points)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(user::Column::Streak)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(user::Column::LastCheckIn).big_integer())
                    .col(
                        ColumnDef::new(user::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_wallet_address_network")
                    .table(user::Entity)
                    .col(user::Column::WalletAddress)
                    .col(user::Column::Network)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(user::Entity).to_owned())
            .await
    }
}
