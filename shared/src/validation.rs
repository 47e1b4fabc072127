//! Validation utilities for the retail stock service

use rust_decimal::Decimal;
use validator::ValidationError;

/// Reject empty or whitespace-only text
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Validate a physical location code (three digits, e.g. "001")
pub fn validate_location_code(code: &str) -> Result<(), &'static str> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err("Location code must be three digits");
    }
    Ok(())
}

/// Largest price a `NUMERIC(12, 2)` column holds
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Largest sale total a `NUMERIC(14, 2)` column holds
pub const MAX_SALE_TOTAL: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Validate a cost or selling price
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    if price > MAX_PRICE {
        return Err("Price exceeds 9999999999.99");
    }
    Ok(())
}

/// `unit_price * quantity`, refusing totals the sales table cannot store
pub fn checked_sale_total(unit_price: Decimal, quantity: i64) -> Result<Decimal, &'static str> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .filter(|total| *total <= MAX_SALE_TOTAL)
        .ok_or("Sale total exceeds 999999999999.99")
}
