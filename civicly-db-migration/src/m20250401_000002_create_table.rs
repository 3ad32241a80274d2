use civicly_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250401_000002_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(check_in::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(check_in::Column::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(check_in::Column::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(check_in::Column::Points)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(check_in::Column::Signature).string().not_null())
                    .col(
                        ColumnDef::new(check_in::Column::Network)
                            .string()
                            .not_null()
                            .default("solana"),
                    )
                    .col(ColumnDef::new(check_in::Column::Day).date().not_null())
                    .col(
                        ColumnDef::new(check_in::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_check_ins_user_id")
                            .from(check_in::Entity, check_in::Column::UserId)
                            .to(user::Entity, user::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // one check-in per user per day
        manager
            .create_index(
                Index::create()
                    .name("idx_check_ins_user_id_day")
                    .table(check_in::Entity)
                    .col(check_in::Column::UserId)
                    .col(check_in::Column::Day)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(check_in::Entity).to_owned())
            .await
    }
}
