//! Postgres-backed inventory store.
//!
//! One row per item in `inventory_items`. The `UNIQUE` constraint on `code`
//! makes `insert` race-free; `adjust` locks the row (`SELECT ... FOR UPDATE`)
//! inside a transaction so concurrent adjustments serialize.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database, code `23505` (unique violation) | `DuplicateCode` |
//! | Database (other) | `Backend` |
//! | PoolTimedOut / PoolClosed / Io / Tls | `Unreachable` |
//! | Other | `Backend` |

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use beadstock_core::ItemId;
use beadstock_inventory::{Adjustment, InventoryItem, ItemCode, Quantity};

use super::r#trait::{AdjustOutcome, InventoryStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS inventory_items (
    id UUID PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    quantity BIGINT NOT NULL CHECK (quantity >= 0),
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)
"#;

const COLUMNS: &str = "id, code, quantity, created_at, updated_at";

/// Postgres-backed inventory store.
///
/// Uses SQLx connection pool which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Build a store over a lazily-connecting pool.
    ///
    /// No connection is opened here; the first query (normally the
    /// connectivity probe) does that, bounded by `acquire_timeout`.
    pub fn connect_lazy(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)
            .map_err(|e| map_sqlx_error("connect_lazy", e))?;
        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip(self), err)]
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM inventory_items ORDER BY code COLLATE \"C\" ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM inventory_items WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(item_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn count(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM inventory_items")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| StoreError::Backend(format!("failed to read count: {e}")))?;
        Ok(n.max(0) as u64)
    }

    #[instrument(skip(self, item), fields(code = %item.code()), err)]
    async fn insert(&self, item: InventoryItem) -> Result<(), StoreError> {
        let result = sqlx::query(&format!(
            "INSERT INTO inventory_items ({COLUMNS}) VALUES ($1, $2, $3, $4, $5)"
        ))
        .bind(item.id().as_uuid())
        .bind(item.code().as_str())
        .bind(item.quantity().value())
        .bind(item.created_at())
        .bind(item.updated_at())
        .execute(&*self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateCode(item.code().to_string())),
            Err(e) => Err(map_sqlx_error("insert", e)),
        }
    }

    #[instrument(skip(self, items), fields(item_count = items.len()), err)]
    async fn insert_missing(&self, items: Vec<InventoryItem>) -> Result<u64, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("insert_missing", e))?;

        let sql = format!(
            "INSERT INTO inventory_items ({COLUMNS}) VALUES ($1, $2, $3, $4, $5) ON CONFLICT (code) DO NOTHING"
        );
        let mut inserted = 0;
        for item in &items {
            let result = sqlx::query(&sql)
                .bind(item.id().as_uuid())
                .bind(item.code().as_str())
                .bind(item.quantity().value())
                .bind(item.created_at())
                .bind(item.updated_at())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_missing", e))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("insert_missing", e))?;
        Ok(inserted)
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn set_quantity(
        &self,
        id: ItemId,
        quantity: Quantity,
        at: DateTime<Utc>,
    ) -> Result<Option<InventoryItem>, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE inventory_items SET quantity = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(quantity.value())
        .bind(at)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_quantity", e))?;

        row.as_ref().map(item_from_row).transpose()
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn adjust(
        &self,
        id: ItemId,
        adjustment: Adjustment,
        at: DateTime<Utc>,
    ) -> Result<AdjustOutcome, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("adjust", e))?;

        let row = sqlx::query("SELECT quantity FROM inventory_items WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("adjust", e))?;

        let Some(row) = row else {
            return Ok(AdjustOutcome::NotFound);
        };
        let current: i64 = row
            .try_get("quantity")
            .map_err(|e| StoreError::Backend(format!("failed to read quantity: {e}")))?;
        let current = Quantity::new(current).map_err(|e| StoreError::Backend(e.to_string()))?;

        let next = match adjustment.apply_to(current) {
            Ok(next) => next,
            // Dropping `tx` rolls back and releases the row lock.
            Err(e) => return Ok(AdjustOutcome::Rejected(e)),
        };

        let row = sqlx::query(&format!(
            "UPDATE inventory_items SET quantity = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(next.value())
        .bind(at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("adjust", e))?;
        let item = item_from_row(&row)?;

        tx.commit().await.map_err(|e| map_sqlx_error("adjust", e))?;
        Ok(AdjustOutcome::Applied(item))
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn remove(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        let row = sqlx::query(&format!(
            "DELETE FROM inventory_items WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("remove", e))?;

        row.as_ref().map(item_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn clear(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM inventory_items")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("clear", e))?;
        Ok(result.rows_affected())
    }
}

fn item_from_row(row: &PgRow) -> Result<InventoryItem, StoreError> {
    let bad_row = |e: sqlx::Error| StoreError::Backend(format!("failed to decode inventory row: {e}"));

    let id: uuid::Uuid = row.try_get("id").map_err(bad_row)?;
    let code: String = row.try_get("code").map_err(bad_row)?;
    let quantity: i64 = row.try_get("quantity").map_err(bad_row)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(bad_row)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(bad_row)?;

    let code = ItemCode::parse(&code).map_err(|e| StoreError::Backend(e.to_string()))?;
    let quantity = Quantity::new(quantity).map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(InventoryItem::restore(
        ItemId::from_uuid(id),
        code,
        quantity,
        created_at,
        updated_at,
    ))
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::DuplicateCode(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unreachable(format!("connection acquire timed out in {}", operation))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unreachable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::Io(e) => StoreError::Unreachable(format!("io error in {}: {}", operation, e)),
        sqlx::Error::Tls(e) => StoreError::Unreachable(format!("tls error in {}: {}", operation, e)),
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failures_map_to_unreachable() {
        assert!(matches!(
            map_sqlx_error("ping", sqlx::Error::PoolTimedOut),
            StoreError::Unreachable(_)
        ));
        assert!(matches!(
            map_sqlx_error("ping", sqlx::Error::PoolClosed),
            StoreError::Unreachable(_)
        ));
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            map_sqlx_error("ping", sqlx::Error::Io(io)),
            StoreError::Unreachable(_)
        ));
    }

    #[test]
    fn other_failures_map_to_backend() {
        assert!(matches!(
            map_sqlx_error("get", sqlx::Error::RowNotFound),
            StoreError::Backend(_)
        ));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn malformed_url_is_rejected_without_connecting() {
        let err = PostgresInventoryStore::connect_lazy("not a url", 1, Duration::from_millis(10))
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
