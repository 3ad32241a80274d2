use civicly_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250401_000004_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(stake::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(stake::Column::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(stake::Column::UserId).uuid().not_null())
                    .col(ColumnDef::new(stake::Column::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(stake::Column::StartDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(stake::Column::EndDate).big_integer().not_null())
                    .col(ColumnDef::new(stake::Column::Signature).string().not_null())
                    .col(
                        ColumnDef::new(stake::Column::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stakes_user_id")
                            .from(stake::Entity, stake::Column::UserId)
                            .to(user::Entity, user::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(stake::Entity).to_owned())
            .await
    }
}
