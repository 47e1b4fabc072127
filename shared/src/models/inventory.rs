//! Inventory record models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Garment size of a stock-keeping unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Size {
    S,
    M,
    L,
    XL,
    XXL,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::XL => "XL",
            Size::XXL => "XXL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "S" => Some(Size::S),
            "M" => Some(Size::M),
            "L" => Some(Size::L),
            "XL" => Some(Size::XL),
            "XXL" => Some(Size::XXL),
            _ => None,
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The natural key of a product variant, independent of where it is stocked.
///
/// Two inventory records describe "the same product" when their identities are
/// equal; at most one active record per identity may exist at a location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdentity {
    pub collection_name: String,
    pub design_name: String,
    pub color: String,
    pub size: Size,
}

/// Current on-hand state of one product variant at one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Location-scoped unique code (e.g., "ITM-0001")
    pub item_code: String,
    pub collection_name: String,
    pub design_name: String,
    pub color: String,
    pub size: Size,
    pub vendor_name: String,
    pub supplier_name: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub remarks: Option<String>,
    pub location_code: String,
    /// Stock physically present; the only stock that may be sold or transferred
    pub in_house_stock: i64,
    /// Stock on order or held by a vendor
    pub out_source_stock: i64,
    /// Always `in_house_stock + out_source_stock`
    pub quantity: i64,
    pub quantity_sold: i64,
    pub is_active: bool,
    pub received_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    pub fn identity(&self) -> ProductIdentity {
        ProductIdentity {
            collection_name: self.collection_name.clone(),
            design_name: self.design_name.clone(),
            color: self.color.clone(),
            size: self.size,
        }
    }

    pub fn matches_identity(&self, identity: &ProductIdentity) -> bool {
        self.collection_name == identity.collection_name
            && self.design_name == identity.design_name
            && self.color == identity.color
            && self.size == identity.size
    }

    /// Record who touched the record and when
    pub fn stamp(&mut self, actor: &str, at: DateTime<Utc>) {
        self.updated_by = actor.to_string();
        self.last_updated = at;
    }
}

/// Filter for listing inventory records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryFilter {
    pub location: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

impl InventoryFilter {
    pub fn matches(&self, item: &InventoryItem) -> bool {
        if !self.include_inactive && !item.is_active {
            return false;
        }
        match &self.location {
            Some(location) => &item.location_code == location,
            None => true,
        }
    }
}
