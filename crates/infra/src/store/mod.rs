//! Persistent inventory store boundary.
//!
//! The repository talks to storage only through [`InventoryStore`]. Two
//! backends exist: an in-memory store for tests/dev and a Postgres store.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use r#trait::{AdjustOutcome, InventoryStore, StoreError};
