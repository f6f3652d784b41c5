use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn status(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(services.status().await)
}

/// Explicit reconnect; answers with the fresh status either way.
pub async fn connect(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    services.connect().await;
    Json(services.status().await)
}

pub async fn import_from_file(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.reseed().await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn reset(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.reset().await {
        Ok(outcome) => {
            tracing::info!(removed = outcome.removed, inserted = outcome.inserted, "inventory reset");
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn export(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let rows = services.export().await;
    Json(serde_json::json!({
        "source": rows.source,
        "records": rows.data.len(),
        "timestamp": Utc::now(),
        "data": rows.data,
    }))
}
