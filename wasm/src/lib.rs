//! WebAssembly module for the retail stock dashboard
//!
//! Provides client-side checks so forms can be validated before submission:
//! - Code previews
//! - Transfer and sale pre-checks
//! - Adjustment previews (with clamping)
//! - Request validation

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    apply_adjustment, checked_sale_total, next_code, validate_price, validate_transfer, AdjustStockRequest, CodePrefix,
    InventoryItem, ReceiveStockRequest, RecordSaleRequest, TransferStockRequest,
};
use validator::Validate;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

/// Code that follows `last_code` for the given prefix (e.g. "ITM")
#[wasm_bindgen]
pub fn preview_next_code(prefix: &str, last_code: Option<String>) -> Result<String, JsValue> {
    next_code_for(prefix, last_code.as_deref()).map_err(js_error)
}

fn next_code_for(prefix: &str, last_code: Option<&str>) -> Result<String, String> {
    let prefix = CodePrefix::from_str(prefix).ok_or_else(|| format!("Unknown code prefix {}", prefix))?;
    Ok(next_code(prefix, last_code))
}

/// Check a transfer against the in-house stock shown on screen
#[wasm_bindgen]
pub fn check_transfer(from: &str, to: &str, quantity: i64, available: i64) -> Result<(), JsValue> {
    transfer_problem(from, to, quantity, available).map_or(Ok(()), |m| Err(js_error(m)))
}

fn transfer_problem(from: &str, to: &str, quantity: i64, available: i64) -> Option<String> {
    if let Err(e) = validate_transfer(from, to, quantity) {
        return Some(e.to_string());
    }
    if available < quantity {
        return Some(format!(
            "Only {} units in house at {}, cannot move {}",
            available, from, quantity
        ));
    }
    None
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdjustmentPreview {
    in_house_stock: i64,
    out_source_stock: i64,
    quantity: i64,
    /// Magnitude the ledger would record
    recorded_quantity: i64,
    clamped: bool,
}

/// Preview an adjustment on an item (JSON) without submitting it
#[wasm_bindgen]
pub fn preview_adjustment(item_json: &str, in_house_change: i64, out_source_change: i64) -> Result<String, JsValue> {
    adjustment_preview(item_json, in_house_change, out_source_change).map_err(js_error)
}

fn adjustment_preview(item_json: &str, in_house_change: i64, out_source_change: i64) -> Result<String, String> {
    let mut item: InventoryItem =
        serde_json::from_str(item_json).map_err(|e| format!("Invalid item JSON: {}", e))?;

    let applied =
        apply_adjustment(&mut item, in_house_change, out_source_change).map_err(|e| e.to_string())?;
    if applied.is_reclassification() {
        return Err("Changes that cancel out must be recorded as separate adjustments".to_string());
    }
    let preview = AdjustmentPreview {
        in_house_stock: item.in_house_stock,
        out_source_stock: item.out_source_stock,
        quantity: item.quantity,
        recorded_quantity: applied.magnitude(),
        clamped: applied.in_house != in_house_change || applied.out_source != out_source_change,
    };
    serde_json::to_string(&preview).map_err(|e| e.to_string())
}

/// Validate a request payload; `kind` is one of receive, adjust, transfer, sale
#[wasm_bindgen]
pub fn validate_request(kind: &str, payload_json: &str) -> Result<(), JsValue> {
    request_problem(kind, payload_json).map_or(Ok(()), |m| Err(js_error(m)))
}

fn request_problem(kind: &str, payload_json: &str) -> Option<String> {
    fn check<T: Validate + serde::de::DeserializeOwned>(json: &str) -> Option<String> {
        match serde_json::from_str::<T>(json) {
            Ok(request) => request.validate().err().map(|e| e.to_string()),
            Err(e) => Some(format!("Invalid request JSON: {}", e)),
        }
    }

    match kind {
        "receive" => check::<ReceiveStockRequest>(payload_json),
        "adjust" => check::<AdjustStockRequest>(payload_json),
        "transfer" => check::<TransferStockRequest>(payload_json),
        "sale" => check::<RecordSaleRequest>(payload_json),
        other => Some(format!("Unknown request kind {}", other)),
    }
}

/// Sale total for a unit price given as a decimal string
#[wasm_bindgen]
pub fn calculate_sale_total(unit_price: &str, quantity: i64) -> Result<String, JsValue> {
    sale_total(unit_price, quantity).map_err(js_error)
}

fn sale_total(unit_price: &str, quantity: i64) -> Result<String, String> {
    let price: Decimal = unit_price
        .parse()
        .map_err(|_| format!("Invalid unit price {}", unit_price))?;
    validate_price(price)?;
    Ok(checked_sale_total(price, quantity)?.to_string())
}
