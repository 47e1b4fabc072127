//! Stock movement ledger models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ledger endpoint for stock arriving from a supplier
pub const VENDOR_ENDPOINT: &str = "vendor";

/// Ledger endpoint for stock leaving through a sale
pub const CUSTOMER_ENDPOINT: &str = "customer";

/// Kind of quantity change recorded in the ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Received,
    Transferred,
    Sold,
    Returned,
    #[default]
    Adjusted,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Received => "received",
            MovementType::Transferred => "transferred",
            MovementType::Sold => "sold",
            MovementType::Returned => "returned",
            MovementType::Adjusted => "adjusted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "received" => Some(MovementType::Received),
            "transferred" => Some(MovementType::Transferred),
            "sold" => Some(MovementType::Sold),
            "returned" => Some(MovementType::Returned),
            "adjusted" => Some(MovementType::Adjusted),
            _ => None,
        }
    }

    /// Whether a manual stock adjustment may be recorded under this type.
    /// Transfers and sales are only written by their own operations.
    pub fn is_adjustable(&self) -> bool {
        !matches!(self, MovementType::Transferred | MovementType::Sold)
    }
}

/// Processing status of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementStatus {
    Pending,
    Completed,
    Cancelled,
}

impl MovementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementStatus::Pending => "pending",
            MovementStatus::Completed => "completed",
            MovementStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(MovementStatus::Pending),
            "completed" => Some(MovementStatus::Completed),
            "cancelled" => Some(MovementStatus::Cancelled),
            _ => None,
        }
    }
}

/// An immutable audit record of one quantity change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub item_code: String,
    pub movement_type: MovementType,
    /// Absent for initial receipts
    pub from_location_code: Option<String>,
    /// Absent for outbound-only moves
    pub to_location_code: Option<String>,
    /// Magnitude of the change, never a signed delta
    pub quantity: i64,
    pub processed_by: String,
    pub movement_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub reference_number: Option<String>,
    pub status: MovementStatus,
}

impl StockMovement {
    /// Build a completed ledger entry stamped at `at`
    pub fn completed(
        item_code: &str,
        movement_type: MovementType,
        quantity: i64,
        processed_by: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_code: item_code.to_string(),
            movement_type,
            from_location_code: None,
            to_location_code: None,
            quantity,
            processed_by: processed_by.to_string(),
            movement_date: at,
            notes: None,
            reference_number: None,
            status: MovementStatus::Completed,
        }
    }

    pub fn between(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.from_location_code = from.map(str::to_string);
        self.to_location_code = to.map(str::to_string);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference_number = Some(reference.into());
        self
    }
}
