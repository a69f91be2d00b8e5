//! Create `item` table.
//! One row per ingested item; `image` holds a path or URL, or '' for none.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Item::Table)
                    .if_not_exists()
                    .col(uuid(Item::Id).primary_key())
                    .col(string_len(Item::Name, 256).not_null())
                    .col(text(Item::Description).not_null().default(""))
                    .col(double(Item::Price).not_null())
                    .col(string_len(Item::Image, 2048).not_null().default(""))
                    .col(timestamp_with_time_zone(Item::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Item::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Item {
    Table,
    Id,
    Name,
    Description,
    Price,
    Image,
    CreatedAt,
}
