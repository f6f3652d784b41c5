//! Inventory repository: the only owner of the record set.
//!
//! Enforces the inventory invariants on top of an [`InventoryStore`]:
//! - `code` unique across the record set
//! - `quantity` never negative (rejected, never clamped, except the lenient
//!   normalization applied on create)
//! - `id` assigned once at creation
//!
//! Every method assumes the store is reachable. Store failures come back as
//! `DomainError::Unavailable`; deciding what to do about them is the
//! availability controller's job.

use std::collections::{BTreeSet, HashSet};

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use beadstock_core::{DomainError, DomainResult, ItemId};
use beadstock_inventory::{
    AdjustDirection, Adjustment, InventoryItem, ItemCode, Quantity, category_index, matches_category,
};

use crate::store::{AdjustOutcome, InventoryStore, StoreError};

/// Compact `(code, quantity)` snapshot row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub code: String,
    pub quantity: i64,
}

impl From<&InventoryItem> for ExportRow {
    fn from(item: &InventoryItem) -> Self {
        Self {
            code: item.code().to_string(),
            quantity: item.quantity().value(),
        }
    }
}

#[derive(Debug)]
pub struct InventoryRepository<S> {
    store: S,
}

impl<S> InventoryRepository<S>
where
    S: InventoryStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Connectivity probe plus schema preparation.
    pub async fn ping(&self) -> DomainResult<()> {
        self.store.ping().await.map_err(map_store_error)?;
        self.store.ensure_schema().await.map_err(map_store_error)
    }

    /// All items ordered by code.
    pub async fn list(&self) -> DomainResult<Vec<InventoryItem>> {
        self.store.list().await.map_err(map_store_error)
    }

    pub async fn get(&self, id: ItemId) -> DomainResult<InventoryItem> {
        self.store
            .get(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(DomainError::not_found)
    }

    pub async fn count(&self) -> DomainResult<u64> {
        self.store.count().await.map_err(map_store_error)
    }

    /// Create an item. Negative quantities normalize to zero.
    pub async fn create(&self, code: &str, quantity: i64) -> DomainResult<InventoryItem> {
        let code = ItemCode::parse(code)?;
        let item = InventoryItem::new(ItemId::new(), code, Quantity::normalized(quantity), Utc::now());

        self.store.insert(item.clone()).await.map_err(|e| match e {
            StoreError::DuplicateCode(_) => {
                DomainError::conflict(format!("code {} already exists", item.code()))
            }
            other => map_store_error(other),
        })?;

        debug!(item_id = %item.id(), code = %item.code(), quantity = %item.quantity(), "item created");
        Ok(item)
    }

    /// Overwrite an item's quantity.
    pub async fn set_quantity(&self, id: ItemId, quantity: Option<i64>) -> DomainResult<InventoryItem> {
        let quantity = quantity.ok_or_else(|| DomainError::invalid_input("quantity is required"))?;
        let quantity = Quantity::new(quantity)?;

        let item = self
            .store
            .set_quantity(id, quantity, Utc::now())
            .await
            .map_err(map_store_error)?
            .ok_or_else(DomainError::not_found)?;

        debug!(item_id = %id, code = %item.code(), quantity = %quantity, "quantity set");
        Ok(item)
    }

    /// Relative adjustment, atomic per item.
    pub async fn adjust(
        &self,
        id: ItemId,
        direction: AdjustDirection,
        amount: Option<i64>,
    ) -> DomainResult<InventoryItem> {
        let adjustment = Adjustment::new(direction, amount)?;

        match self
            .store
            .adjust(id, adjustment, Utc::now())
            .await
            .map_err(map_store_error)?
        {
            AdjustOutcome::Applied(item) => {
                debug!(
                    item_id = %id,
                    code = %item.code(),
                    direction = direction.as_str(),
                    amount = adjustment.amount(),
                    quantity = %item.quantity(),
                    "quantity adjusted"
                );
                Ok(item)
            }
            AdjustOutcome::NotFound => Err(DomainError::not_found()),
            AdjustOutcome::Rejected(e) => Err(e),
        }
    }

    /// Delete an item, returning the removed record.
    pub async fn delete(&self, id: ItemId) -> DomainResult<InventoryItem> {
        let item = self
            .store
            .remove(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(DomainError::not_found)?;

        debug!(item_id = %id, code = %item.code(), "item deleted");
        Ok(item)
    }

    /// Distinct category labels over the current record set.
    pub async fn categories(&self) -> DomainResult<BTreeSet<String>> {
        let items = self.list().await?;
        Ok(category_index(items.iter().map(|i| i.code().as_str())))
    }

    /// Items listed under `category`, ordered by code.
    pub async fn items_by_category(&self, category: &str) -> DomainResult<Vec<InventoryItem>> {
        let mut items = self.list().await?;
        items.retain(|i| matches_category(i.code().as_str(), category));
        Ok(items)
    }

    /// Insert each not-yet-present code with quantity zero.
    ///
    /// Duplicate and blank codes in the input are skipped. Returns the number
    /// of records inserted.
    pub async fn import_codes(&self, codes: &[String]) -> DomainResult<u64> {
        let now = Utc::now();
        let mut seen = HashSet::new();
        let items: Vec<InventoryItem> = codes
            .iter()
            .filter_map(|raw| ItemCode::parse(raw).ok())
            .filter(|code| seen.insert(code.clone()))
            .map(|code| InventoryItem::new(ItemId::new(), code, Quantity::ZERO, now))
            .collect();

        if items.is_empty() {
            return Ok(0);
        }
        self.store.insert_missing(items).await.map_err(map_store_error)
    }

    /// Remove every record.
    pub async fn clear(&self) -> DomainResult<u64> {
        self.store.clear().await.map_err(map_store_error)
    }

    /// `(code, quantity)` snapshot ordered by code.
    pub async fn export(&self) -> DomainResult<Vec<ExportRow>> {
        Ok(self.list().await?.iter().map(ExportRow::from).collect())
    }
}

fn map_store_error(err: StoreError) -> DomainError {
    match err {
        StoreError::DuplicateCode(code) => DomainError::conflict(format!("code {code} already exists")),
        other => DomainError::unavailable(other.to_string()),
    }
}
