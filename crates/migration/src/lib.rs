//! Migrator for the item table.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_item;
mod m20240601_000002_add_indexes;
mod m20240601_000003_add_item_seq;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_item::Migration),
            Box::new(m20240601_000002_add_indexes::Migration),
            Box::new(m20240601_000003_add_item_seq::Migration),
        ]
    }
}
