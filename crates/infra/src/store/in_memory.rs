use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use beadstock_core::ItemId;
use beadstock_inventory::{Adjustment, InventoryItem, ItemCode, Quantity};

use super::r#trait::{AdjustOutcome, InventoryStore, StoreError};

#[derive(Debug, Default)]
struct Records {
    items: HashMap<ItemId, InventoryItem>,
    by_code: BTreeMap<ItemCode, ItemId>,
}

impl Records {
    fn insert(&mut self, item: InventoryItem) -> bool {
        if self.by_code.contains_key(item.code()) {
            return false;
        }
        self.by_code.insert(item.code().clone(), item.id());
        self.items.insert(item.id(), item);
        true
    }
}

/// In-memory inventory store.
///
/// Intended for tests/dev. One write lock covers every mutation, which makes
/// `insert` and `adjust` atomic. The store can be flipped to "unreachable" to
/// exercise degraded paths; every call then fails with `Unreachable`.
#[derive(Debug)]
pub struct InMemoryInventoryStore {
    records: RwLock<Records>,
    reachable: AtomicBool,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records::default()),
            reachable: AtomicBool::new(true),
        }
    }

    /// Simulate an outage (`false`) or recovery (`true`).
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unreachable("in-memory store marked unreachable".to_string()))
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Records>, StoreError> {
        self.check_reachable()?;
        self.records
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Records>, StoreError> {
        self.check_reachable()?;
        self.records
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

impl Default for InMemoryInventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_reachable()
    }

    async fn list(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let records = self.read()?;
        Ok(records
            .by_code
            .values()
            .filter_map(|id| records.items.get(id).cloned())
            .collect())
    }

    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.items.len() as u64)
    }

    async fn insert(&self, item: InventoryItem) -> Result<(), StoreError> {
        let code = item.code().to_string();
        if self.write()?.insert(item) {
            Ok(())
        } else {
            Err(StoreError::DuplicateCode(code))
        }
    }

    async fn insert_missing(&self, items: Vec<InventoryItem>) -> Result<u64, StoreError> {
        let mut records = self.write()?;
        let mut inserted = 0;
        for item in items {
            if records.insert(item) {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn set_quantity(
        &self,
        id: ItemId,
        quantity: Quantity,
        at: DateTime<Utc>,
    ) -> Result<Option<InventoryItem>, StoreError> {
        let mut records = self.write()?;
        Ok(records.items.get_mut(&id).map(|item| {
            item.set_quantity(quantity, at);
            item.clone()
        }))
    }

    async fn adjust(
        &self,
        id: ItemId,
        adjustment: Adjustment,
        at: DateTime<Utc>,
    ) -> Result<AdjustOutcome, StoreError> {
        let mut records = self.write()?;
        let Some(item) = records.items.get_mut(&id) else {
            return Ok(AdjustOutcome::NotFound);
        };
        Ok(match item.adjust(adjustment, at) {
            Ok(()) => AdjustOutcome::Applied(item.clone()),
            Err(e) => AdjustOutcome::Rejected(e),
        })
    }

    async fn remove(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        let mut records = self.write()?;
        let removed = records.items.remove(&id);
        if let Some(item) = &removed {
            records.by_code.remove(item.code());
        }
        Ok(removed)
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let mut records = self.write()?;
        let removed = records.items.len() as u64;
        records.items.clear();
        records.by_code.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beadstock_inventory::AdjustDirection;

    fn item(code: &str, quantity: i64) -> InventoryItem {
        InventoryItem::new(
            ItemId::new(),
            ItemCode::parse(code).unwrap(),
            Quantity::new(quantity).unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn list_is_ordered_by_code() {
        let store = InMemoryInventoryStore::new();
        for code in ["B1", "A2", "A1", "C1"] {
            store.insert(item(code, 0)).await.unwrap();
        }

        let codes: Vec<_> = store
            .list()
            .await
            .unwrap()
            .iter()
            .map(|i| i.code().to_string())
            .collect();
        assert_eq!(codes, vec!["A1", "A2", "B1", "C1"]);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected_and_store_unchanged() {
        let store = InMemoryInventoryStore::new();
        let first = item("A1", 5);
        store.insert(first.clone()).await.unwrap();

        let err = store.insert(item("A1", 9)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCode(code) if code == "A1"));
        assert_eq!(store.list().await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn remove_frees_the_code() {
        let store = InMemoryInventoryStore::new();
        let first = item("A1", 5);
        store.insert(first.clone()).await.unwrap();

        assert_eq!(store.remove(first.id()).await.unwrap(), Some(first));
        store.insert(item("A1", 3)).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_missing_skips_taken_codes() {
        let store = InMemoryInventoryStore::new();
        store.insert(item("A1", 7)).await.unwrap();

        let inserted = store
            .insert_missing(vec![item("A1", 0), item("A2", 0), item("A2", 0)])
            .await
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn rejected_adjust_leaves_record_unchanged() {
        let store = InMemoryInventoryStore::new();
        let a1 = item("A1", 2);
        store.insert(a1.clone()).await.unwrap();

        let adj = Adjustment::new(AdjustDirection::Decrease, Some(3)).unwrap();
        let outcome = store.adjust(a1.id(), adj, Utc::now()).await.unwrap();
        assert!(matches!(outcome, AdjustOutcome::Rejected(_)));
        assert_eq!(store.get(a1.id()).await.unwrap(), Some(a1));
    }

    #[tokio::test]
    async fn unreachable_store_fails_every_call() {
        let store = InMemoryInventoryStore::new();
        store.set_reachable(false);

        assert!(matches!(store.ping().await, Err(StoreError::Unreachable(_))));
        assert!(matches!(store.list().await, Err(StoreError::Unreachable(_))));
        assert!(matches!(store.insert(item("A1", 0)).await, Err(StoreError::Unreachable(_))));

        store.set_reachable(true);
        assert!(store.ping().await.is_ok());
    }
}
