//! Infrastructure wiring: picks the store backend and builds the controller.

use std::sync::Arc;

use beadstock_infra::{
    AvailabilityController, DemoGenerator, InMemoryInventoryStore, InfraConfig, InventoryRepository,
    InventoryStore, PostgresInventoryStore, SeedSource, StoreError,
};

/// Backend chosen at startup.
pub type DynStore = Arc<dyn InventoryStore>;

/// Shared application state handed to every handler.
pub type AppServices = AvailabilityController<DynStore>;

/// Postgres when `DATABASE_URL` is set, in-memory otherwise.
pub fn build_store(config: &InfraConfig) -> Result<DynStore, StoreError> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("using Postgres inventory store");
            let store =
                PostgresInventoryStore::connect_lazy(url, config.max_connections, config.probe_timeout)?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("using in-memory inventory store");
            Ok(Arc::new(InMemoryInventoryStore::new()))
        }
    }
}

/// Build the controller and run the initial connectivity probe.
///
/// A failed probe is not an error: the service starts in degraded mode.
pub async fn build_services(config: &InfraConfig, store: DynStore) -> AppServices {
    let seed = SeedSource::new(config.seed_path.clone());
    let demo = DemoGenerator::new(seed.clone()).with_rng_seed(config.demo_rng_seed);
    let services = AvailabilityController::new(InventoryRepository::new(store), seed, demo, config.probe_timeout)
        .with_operation_timeout(config.operation_timeout);

    let state = services.connect().await;
    tracing::info!(?state, seed = %config.seed_path.display(), "initial store probe finished");
    services
}
