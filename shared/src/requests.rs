//! Request payloads accepted by the stock API
//!
//! Shared with the browser so forms can be checked before they are submitted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{MovementType, Size};
use crate::validation::not_blank;

/// Initial receipt of stock at a location
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveStockRequest {
    #[validate(custom = "not_blank")]
    pub collection_name: String,
    #[validate(custom = "not_blank")]
    pub design_name: String,
    #[validate(custom = "not_blank")]
    pub color: String,
    pub size: Size,
    #[validate(custom = "not_blank")]
    pub vendor_name: String,
    pub supplier_name: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub remarks: Option<String>,
    #[validate(custom = "not_blank")]
    pub location_code: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "inHouseStock cannot be negative"))]
    pub in_house_stock: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "outSourceStock cannot be negative"))]
    pub out_source_stock: i64,
    #[validate(custom = "not_blank")]
    pub received_by: String,
}

/// Signed change to one record's stock components
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    #[validate(custom = "not_blank")]
    pub item_code: String,
    #[serde(default)]
    pub in_house_change: i64,
    #[serde(default)]
    pub out_source_change: i64,
    #[validate(custom = "not_blank")]
    pub updated_by: String,
    pub notes: Option<String>,
    pub movement_type: Option<MovementType>,
}

/// Move in-house stock between two locations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferStockRequest {
    #[validate(custom = "not_blank")]
    pub item_code: String,
    #[validate(custom = "not_blank")]
    pub from_location_code: String,
    #[validate(custom = "not_blank")]
    pub to_location_code: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
    #[validate(custom = "not_blank")]
    pub transferred_by: String,
    pub notes: Option<String>,
}

/// Sale of in-house stock at a shop
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleRequest {
    #[validate(custom = "not_blank")]
    pub item_code: String,
    #[validate(custom = "not_blank")]
    pub shop_code: String,
    #[validate(range(min = 1, message = "quantitySold must be at least 1"))]
    pub quantity_sold: i64,
    /// Defaults to the record's selling price
    pub unit_price: Option<Decimal>,
    #[validate(custom = "not_blank")]
    pub sold_by: String,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
}
