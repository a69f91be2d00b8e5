use async_trait::async_trait;

use super::domain::{Item, ItemId, NewItem};
use crate::errors::ServiceError;

/// Persistence abstraction for the item collection.
///
/// Implementations serialize their own writes so concurrent inserts never
/// lose an entry or hand out the same id twice.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Short backend label for logs.
    fn backend(&self) -> &'static str;

    /// Parse a path segment into this backend's id scheme.
    fn parse_id(&self, raw: &str) -> Result<ItemId, ServiceError>;

    /// Append a record and return the id it was assigned.
    async fn insert(&self, item: &NewItem) -> Result<ItemId, ServiceError>;
    /// Every item, in insertion order.
    async fn find_all(&self) -> Result<Vec<Item>, ServiceError>;
    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, ServiceError>;
    /// Returns whether an item was removed.
    async fn delete_by_id(&self, id: ItemId) -> Result<bool, ServiceError>;
}

/// In-process store: an ordered sequence plus a monotonic id counter.
pub mod memory {
    use super::*;
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct State {
        items: Vec<Item>,
        last_id: u64,
    }

    #[derive(Default)]
    pub struct MemoryItemStore {
        state: RwLock<State>,
    }

    impl MemoryItemStore {
        pub fn new() -> Self { Self::default() }

        pub async fn len(&self) -> usize {
            self.state.read().await.items.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.len().await == 0
        }
    }

    #[async_trait]
    impl ItemStore for MemoryItemStore {
        fn backend(&self) -> &'static str { "memory" }

        fn parse_id(&self, raw: &str) -> Result<ItemId, ServiceError> {
            match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => Ok(ItemId::Seq(n)),
                _ => Err(ServiceError::Validation(format!("invalid item id: {raw}"))),
            }
        }

        async fn insert(&self, item: &NewItem) -> Result<ItemId, ServiceError> {
            let mut state = self.state.write().await;
            state.last_id += 1;
            let id = ItemId::Seq(state.last_id);
            state.items.push(item.clone().with_id(id));
            Ok(id)
        }

        async fn find_all(&self) -> Result<Vec<Item>, ServiceError> {
            Ok(self.state.read().await.items.clone())
        }

        async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, ServiceError> {
            let state = self.state.read().await;
            Ok(state.items.iter().find(|i| i.id == id).cloned())
        }

        async fn delete_by_id(&self, id: ItemId) -> Result<bool, ServiceError> {
            let mut state = self.state.write().await;
            match state.items.iter().position(|i| i.id == id) {
                Some(pos) => {
                    state.items.remove(pos);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

}
