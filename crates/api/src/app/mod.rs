//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and controller construction
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and lenient value parsing
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use beadstock_infra::{InfraConfig, StoreError};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: InfraConfig) -> Result<Router, StoreError> {
    let store = services::build_store(&config)?;
    Ok(build_app_with_store(config, store).await)
}

/// Same router over a caller-supplied store.
pub async fn build_app_with_store(config: InfraConfig, store: services::DynStore) -> Router {
    let services = Arc::new(services::build_services(&config, store).await);

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .layer(Extension(services))
}
