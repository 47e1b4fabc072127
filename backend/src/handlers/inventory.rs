//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{
    AdjustStockRequest, InventoryFilter, InventoryItem, ReceiveStockRequest, StockMovement,
    TransferStockRequest,
};

use crate::error::AppResult;
use crate::services::inventory::{AdjustmentResult, InventoryService, TransferResult};
use crate::AppState;

fn service(state: &AppState) -> InventoryService {
    InventoryService::new(state.store.clone(), state.config.inventory.clone())
}

/// Receive vendor stock at a location
pub async fn receive_stock(
    State(state): State<AppState>,
    Json(input): Json<ReceiveStockRequest>,
) -> AppResult<(StatusCode, Json<InventoryItem>)> {
    let item = service(&state).receive_stock(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// List inventory records, optionally for one location
pub async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<InventoryFilter>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let items = service(&state).list_items(&filter).await?;
    Ok(Json(items))
}

/// Get one inventory record, active or not
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_code): Path<String>,
) -> AppResult<Json<InventoryItem>> {
    let item = service(&state).get_item(&item_code).await?;
    Ok(Json(item))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateQuery {
    pub updated_by: String,
}

/// Soft-delete an inventory record
pub async fn deactivate_item(
    State(state): State<AppState>,
    Path(item_code): Path<String>,
    Query(query): Query<DeactivateQuery>,
) -> AppResult<Json<InventoryItem>> {
    let item = service(&state)
        .deactivate_item(&item_code, &query.updated_by)
        .await?;
    Ok(Json(item))
}

/// Adjust a record's in-house and out-source stock
pub async fn adjust_stock(
    State(state): State<AppState>,
    Json(input): Json<AdjustStockRequest>,
) -> AppResult<Json<AdjustmentResult>> {
    let result = service(&state).adjust_stock(input).await?;
    Ok(Json(result))
}

/// Transfer in-house stock between locations
pub async fn transfer_stock(
    State(state): State<AppState>,
    Json(input): Json<TransferStockRequest>,
) -> AppResult<Json<TransferResult>> {
    let result = service(&state).transfer_stock(input).await?;
    Ok(Json(result))
}

/// Movement history of a record, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    Path(item_code): Path<String>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let movements = service(&state).list_movements(&item_code).await?;
    Ok(Json(movements))
}
