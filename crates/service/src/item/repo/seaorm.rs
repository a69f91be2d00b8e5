use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::item::domain::{Item, ItemId, NewItem};
use crate::item::repository::ItemStore;

/// Postgres-backed store; ids are UUIDs generated on insert.
pub struct SeaOrmItemStore {
    pub db: DatabaseConnection,
}

fn to_item(m: models::item::Model) -> Item {
    Item { id: ItemId::Key(m.id), name: m.name, description: m.description, price: m.price, image: m.image }
}

#[async_trait::async_trait]
impl ItemStore for SeaOrmItemStore {
    fn backend(&self) -> &'static str { "postgres" }

    fn parse_id(&self, raw: &str) -> Result<ItemId, ServiceError> {
        Uuid::parse_str(raw.trim())
            .map(ItemId::Key)
            .map_err(|_| ServiceError::Validation(format!("invalid item id: {raw}")))
    }

    async fn insert(&self, item: &NewItem) -> Result<ItemId, ServiceError> {
        let created = models::item::create(&self.db, &item.name, &item.description, item.price, &item.image).await?;
        Ok(ItemId::Key(created.id))
    }

    async fn find_all(&self) -> Result<Vec<Item>, ServiceError> {
        let rows = models::item::list_ordered(&self.db).await?;
        Ok(rows.into_iter().map(to_item).collect())
    }

    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, ServiceError> {
        let ItemId::Key(key) = id else { return Ok(None); };
        Ok(models::item::find(&self.db, key).await?.map(to_item))
    }

    async fn delete_by_id(&self, id: ItemId) -> Result<bool, ServiceError> {
        let ItemId::Key(key) = id else { return Ok(false); };
        Ok(models::item::delete(&self.db, key).await?)
    }
}
