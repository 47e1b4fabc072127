//! Route definitions for the retail stock service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/inventory", inventory_routes())
        .nest("/sales", sales_routes())
        .route("/codes/:prefix", post(handlers::reserve_code))
}

/// Inventory record, adjustment and transfer routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items))
        .route("/receive", post(handlers::receive_stock))
        .route("/adjust", post(handlers::adjust_stock))
        .route("/transfer", post(handlers::transfer_stock))
        .route(
            "/:item_code",
            get(handlers::get_item).delete(handlers::deactivate_item),
        )
        .route("/:item_code/movements", get(handlers::list_movements))
}

/// Sales routes
fn sales_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::list_sales).post(handlers::record_sale))
}
