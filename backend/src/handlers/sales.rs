//! HTTP handlers for sales endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{RecordSaleRequest, Sale};

use crate::error::AppResult;
use crate::services::SalesService;
use crate::AppState;

/// Query parameters for listing sales
#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    pub shop: Option<String>,
}

/// Record a shop sale
pub async fn record_sale(
    State(state): State<AppState>,
    Json(input): Json<RecordSaleRequest>,
) -> AppResult<(StatusCode, Json<Sale>)> {
    let service = SalesService::new(state.store.clone(), state.config.inventory.clone());
    let sale = service.record_sale(input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// List sales, newest first
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListSalesQuery>,
) -> AppResult<Json<Vec<Sale>>> {
    let service = SalesService::new(state.store.clone(), state.config.inventory.clone());
    let sales = service.list_sales(query.shop.as_deref()).await?;
    Ok(Json(sales))
}
