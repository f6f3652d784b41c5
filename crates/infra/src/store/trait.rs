use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use beadstock_core::{DomainError, ItemId};
use beadstock_inventory::{Adjustment, InventoryItem, Quantity};

/// Store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors. The only
/// one with domain meaning is `DuplicateCode`, raised by the store's own
/// uniqueness constraint on `code`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached (connect/acquire timeout, IO, closed pool).
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// Insert rejected because another record already uses this code.
    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    /// Any other backend failure (bad row, constraint, lock poisoned).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result of an atomic relative adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustOutcome {
    /// The delta was applied; carries the updated record.
    Applied(InventoryItem),
    /// No record has the id.
    NotFound,
    /// The record exists but the domain rejected the adjustment
    /// (e.g. insufficient stock). The stored record is unchanged.
    Rejected(DomainError),
}

/// Single-collection store of inventory records with a unique `code`.
///
/// ## Atomicity
///
/// Implementations must make these steps atomic:
/// - `insert`: uniqueness check + insert (no duplicate-code race)
/// - `adjust`: read current quantity + write new quantity (no lost updates)
///
/// Nothing else is transactional; bulk operations may partially apply.
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Create backing structures if missing. Called once per successful connect.
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// All records ordered by `code` ascending.
    async fn list(&self) -> Result<Vec<InventoryItem>, StoreError>;

    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Insert a new record; `DuplicateCode` if the code is taken.
    async fn insert(&self, item: InventoryItem) -> Result<(), StoreError>;

    /// Insert every record whose code is not already present; returns how many were inserted.
    async fn insert_missing(&self, items: Vec<InventoryItem>) -> Result<u64, StoreError>;

    /// Overwrite the quantity; `None` if the id is unknown.
    async fn set_quantity(
        &self,
        id: ItemId,
        quantity: Quantity,
        at: DateTime<Utc>,
    ) -> Result<Option<InventoryItem>, StoreError>;

    /// Apply a relative adjustment atomically.
    async fn adjust(
        &self,
        id: ItemId,
        adjustment: Adjustment,
        at: DateTime<Utc>,
    ) -> Result<AdjustOutcome, StoreError>;

    /// Remove a record, returning it; `None` if the id is unknown.
    async fn remove(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError>;

    /// Remove every record; returns how many were removed.
    async fn clear(&self) -> Result<u64, StoreError>;
}

#[async_trait::async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        (**self).ensure_schema().await
    }

    async fn list(&self) -> Result<Vec<InventoryItem>, StoreError> {
        (**self).list().await
    }

    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        (**self).get(id).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        (**self).count().await
    }

    async fn insert(&self, item: InventoryItem) -> Result<(), StoreError> {
        (**self).insert(item).await
    }

    async fn insert_missing(&self, items: Vec<InventoryItem>) -> Result<u64, StoreError> {
        (**self).insert_missing(items).await
    }

    async fn set_quantity(
        &self,
        id: ItemId,
        quantity: Quantity,
        at: DateTime<Utc>,
    ) -> Result<Option<InventoryItem>, StoreError> {
        (**self).set_quantity(id, quantity, at).await
    }

    async fn adjust(
        &self,
        id: ItemId,
        adjustment: Adjustment,
        at: DateTime<Utc>,
    ) -> Result<AdjustOutcome, StoreError> {
        (**self).adjust(id, adjustment, at).await
    }

    async fn remove(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        (**self).remove(id).await
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        (**self).clear().await
    }
}
