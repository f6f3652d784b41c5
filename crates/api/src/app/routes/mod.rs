use axum::{
    Router,
    routing::{get, patch, post},
};

pub mod inventory;
pub mod system;

/// Router for every `/api` endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/status", get(system::status))
        .route("/connect", post(system::connect))
        .route("/inventory", get(inventory::list_items).post(inventory::create_item))
        .route(
            "/inventory/:id",
            get(inventory::get_item)
                .put(inventory::set_quantity)
                .delete(inventory::delete_item),
        )
        .route("/inventory/:id/adjust", patch(inventory::adjust_item))
        .route("/categories", get(inventory::list_categories))
        .route("/categories/:prefix/items", get(inventory::items_by_category))
        .route("/import-from-file", post(system::import_from_file))
        .route("/reset", post(system::reset))
        .route("/export", get(system::export))
}
