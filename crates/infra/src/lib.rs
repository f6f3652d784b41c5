//! Infrastructure layer: stores, seeding, degradation control, config.

pub mod availability;
pub mod config;
pub mod demo;
pub mod repository;
pub mod seed;
pub mod store;

pub use availability::{AvailabilityController, ConnectionState, DataSource, ReseedOutcome, Sourced, StatusReport};
pub use config::{ConfigError, InfraConfig};
pub use demo::DemoGenerator;
pub use repository::{ExportRow, InventoryRepository};
pub use seed::{SeedError, SeedSource};
pub use store::{AdjustOutcome, InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StoreError};
