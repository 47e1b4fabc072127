//! Sale models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A recorded shop sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Sequential sale identifier (e.g., "SALE-0001")
    pub sale_id: String,
    pub item_code: String,
    pub shop_code: String,
    pub quantity_sold: i64,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub sold_by: String,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub sale_date: DateTime<Utc>,
}
