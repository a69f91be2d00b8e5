//! `seq` column: a database sequence giving exact insertion order.
//! `created_at` alone can tie for rows written in the same microsecond.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Item::Table)
                    .add_column_if_not_exists(ColumnDef::new(Item::Seq).big_integer().not_null().auto_increment())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_item_seq")
                    .table(Item::Table)
                    .col(Item::Seq)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_item_seq").table(Item::Table).to_owned())
            .await?;
        manager
            .alter_table(Table::alter().table(Item::Table).drop_column(Item::Seq).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Item {
    Table,
    Seq,
}
