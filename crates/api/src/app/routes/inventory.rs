use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use beadstock_core::ItemId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

fn parse_id(id: &str) -> Result<ItemId, axum::response::Response> {
    id.parse().map_err(errors::domain_error_to_response)
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    body.map(|Json(b)| b)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()))
}

pub async fn list_items(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let items = services.list().await;
    (StatusCode::OK, Json(items)).into_response()
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get(id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let quantity = dto::lenient_quantity(body.quantity.as_ref());
    match services.create(&body.code, quantity).await {
        Ok(item) => {
            tracing::info!(item_id = %item.id(), code = %item.code(), "inventory item created");
            (StatusCode::CREATED, Json(item)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn set_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::SetQuantityRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let quantity = match dto::strict_integer("quantity", body.quantity.as_ref()) {
        Ok(q) => q,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.set_quantity(id, quantity).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn adjust_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::AdjustRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let direction = match body.direction() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let amount = match dto::strict_integer("amount", body.amount.as_ref()) {
        Ok(a) => a,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.adjust(id, direction, amount).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.delete(id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_categories(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    (StatusCode::OK, Json(services.categories().await)).into_response()
}

pub async fn items_by_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(prefix): Path<String>,
) -> axum::response::Response {
    (StatusCode::OK, Json(services.items_by_category(&prefix).await)).into_response()
}
