//! Stock arithmetic shared by the backend and the browser
//!
//! Every mutation goes through these helpers so that the stored `quantity`
//! stays equal to `in_house_stock + out_source_stock` and no component ever
//! drops below zero.

use thiserror::Error;

use crate::models::InventoryItem;

/// Domain rule violations raised before anything is persisted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("source and destination must differ")]
    SameLocation,

    #[error("{field} must be at least 1")]
    NonPositiveQuantity { field: &'static str },

    #[error("insufficient stock for {item_code} at {location_code}: available {available}, requested {requested}")]
    InsufficientStock {
        item_code: String,
        location_code: String,
        available: i64,
        requested: i64,
    },

    #[error("stock for {item_code} would exceed the supported range")]
    QuantityOverflow { item_code: String },

    #[error("inventory invariant broken for {item_code}: {reason}")]
    InvariantViolation { item_code: String, reason: String },
}

/// What an adjustment actually changed after clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppliedAdjustment {
    pub in_house: i64,
    pub out_source: i64,
}

impl AppliedAdjustment {
    /// Signed net change across both components
    pub fn net(&self) -> i64 {
        self.in_house.saturating_add(self.out_source)
    }

    /// Magnitude recorded in the ledger
    pub fn magnitude(&self) -> i64 {
        i64::try_from(self.net().unsigned_abs()).unwrap_or(i64::MAX)
    }

    pub fn is_noop(&self) -> bool {
        self.net() == 0
    }

    /// Stock moved between the two components with no net change
    pub fn is_reclassification(&self) -> bool {
        self.is_noop() && self.in_house != 0
    }
}

/// Apply signed deltas to both stock components, clamping each at zero.
///
/// Returns the change that was really applied, which differs from the request
/// whenever a negative delta exceeds the stock on hand. The record is left
/// untouched when a component or the total would leave the `i64` range.
pub fn apply_adjustment(
    item: &mut InventoryItem,
    in_house_delta: i64,
    out_source_delta: i64,
) -> Result<AppliedAdjustment, StockError> {
    let in_house = checked(item, item.in_house_stock.checked_add(in_house_delta))?.max(0);
    let out_source = checked(item, item.out_source_stock.checked_add(out_source_delta))?.max(0);
    let quantity = checked(item, in_house.checked_add(out_source))?;

    let applied = AppliedAdjustment {
        in_house: checked(item, in_house.checked_sub(item.in_house_stock))?,
        out_source: checked(item, out_source.checked_sub(item.out_source_stock))?,
    };

    item.in_house_stock = in_house;
    item.out_source_stock = out_source;
    item.quantity = quantity;
    Ok(applied)
}

/// Reject transfer requests that can never succeed, before any lookup
pub fn validate_transfer(from: &str, to: &str, quantity: i64) -> Result<(), StockError> {
    if from == to {
        return Err(StockError::SameLocation);
    }
    if quantity < 1 {
        return Err(StockError::NonPositiveQuantity { field: "quantity" });
    }
    Ok(())
}

/// Remove `quantity` from in-house stock; out-source stock is never eligible
pub fn withdraw_in_house(item: &mut InventoryItem, quantity: i64) -> Result<(), StockError> {
    if quantity < 1 {
        return Err(StockError::NonPositiveQuantity { field: "quantity" });
    }
    if item.in_house_stock < quantity {
        return Err(StockError::InsufficientStock {
            item_code: item.item_code.clone(),
            location_code: item.location_code.clone(),
            available: item.in_house_stock,
            requested: quantity,
        });
    }
    item.in_house_stock -= quantity;
    item.quantity -= quantity;
    Ok(())
}

/// Add `quantity` to in-house stock
pub fn deposit_in_house(item: &mut InventoryItem, quantity: i64) -> Result<(), StockError> {
    if quantity < 1 {
        return Err(StockError::NonPositiveQuantity { field: "quantity" });
    }
    item.in_house_stock = checked(item, item.in_house_stock.checked_add(quantity))?;
    item.quantity = checked(item, item.in_house_stock.checked_add(item.out_source_stock))?;
    Ok(())
}

/// Add received quantities to both components
pub fn receive_into(
    item: &mut InventoryItem,
    in_house: i64,
    out_source: i64,
) -> Result<(), StockError> {
    if in_house < 0 || out_source < 0 || in_house.saturating_add(out_source) < 1 {
        return Err(StockError::NonPositiveQuantity { field: "received quantity" });
    }
    item.in_house_stock = checked(item, item.in_house_stock.checked_add(in_house))?;
    item.out_source_stock = checked(item, item.out_source_stock.checked_add(out_source))?;
    item.quantity = checked(item, item.in_house_stock.checked_add(item.out_source_stock))?;
    Ok(())
}

fn checked(item: &InventoryItem, value: Option<i64>) -> Result<i64, StockError> {
    value.ok_or_else(|| StockError::QuantityOverflow {
        item_code: item.item_code.clone(),
    })
}

/// Verify the per-record invariants: non-negative components and
/// `quantity == in_house_stock + out_source_stock`
pub fn check_invariants(item: &InventoryItem) -> Result<(), StockError> {
    let violation = |reason: &str| StockError::InvariantViolation {
        item_code: item.item_code.clone(),
        reason: reason.to_string(),
    };

    if item.in_house_stock < 0 {
        return Err(violation("negative in-house stock"));
    }
    if item.out_source_stock < 0 {
        return Err(violation("negative out-source stock"));
    }
    match item.in_house_stock.checked_add(item.out_source_stock) {
        Some(total) if total == item.quantity => Ok(()),
        Some(_) => Err(violation("quantity does not equal in-house plus out-source stock")),
        None => Err(violation("stock exceeds the supported range")),
    }
}

/// Default ledger note for an adjustment with net change `net`
pub fn adjustment_note(net: i64) -> String {
    if net >= 0 {
        format!("Stock increased by {} units", net)
    } else {
        format!("Stock decreased by {} units", net.abs())
    }
}

/// Default ledger note for a transfer
pub fn transfer_note(quantity: i64, from: &str, to: &str) -> String {
    format!("Transferred {} units from {} to {}", quantity, from, to)
}

/// Remark written on a record minted at a transfer destination
pub fn transfer_remark(from: &str, source_item_code: &str) -> String {
    format!("Transferred from {} ({})", from, source_item_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Size;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn item(in_house: i64, out_source: i64) -> InventoryItem {
        let now = Utc::now();
        InventoryItem {
            item_code: "ITM-0001".to_string(),
            collection_name: "Summer".to_string(),
            design_name: "Floral Kurta".to_string(),
            color: "Blue".to_string(),
            size: Size::M,
            vendor_name: "Acme Textiles".to_string(),
            supplier_name: None,
            cost_price: Decimal::new(1200, 0),
            selling_price: Decimal::new(1800, 0),
            remarks: None,
            location_code: "001".to_string(),
            in_house_stock: in_house,
            out_source_stock: out_source,
            quantity: in_house + out_source,
            quantity_sold: 0,
            is_active: true,
            received_by: "alice".to_string(),
            updated_by: "alice".to_string(),
            created_at: now,
            last_updated: now,
        }
    }

    #[test]
    fn test_adjustment_within_stock() {
        let mut it = item(10, 5);
        let applied = apply_adjustment(&mut it, -4, 3).unwrap();
        assert_eq!(applied, AppliedAdjustment { in_house: -4, out_source: 3 });
        assert_eq!((it.in_house_stock, it.out_source_stock, it.quantity), (6, 8, 14));
        assert_eq!(applied.magnitude(), 1);
    }

    #[test]
    fn test_adjustment_clamps_at_zero() {
        let mut it = item(10, 0);
        let applied = apply_adjustment(&mut it, -100, 0).unwrap();
        assert_eq!(it.in_house_stock, 0);
        assert_eq!(it.quantity, 0);
        assert_eq!(applied.in_house, -10);
        assert_eq!(applied.magnitude(), 10);
    }

    #[test]
    fn test_adjustment_past_i64_range_is_rejected_untouched() {
        let mut it = item(10, 5);
        let before = it.clone();
        assert!(matches!(
            apply_adjustment(&mut it, i64::MAX, 0),
            Err(StockError::QuantityOverflow { .. })
        ));
        assert_eq!(it, before);

        // Each component fits but the total does not
        let mut it = item(i64::MAX - 5, 0);
        assert!(apply_adjustment(&mut it, 0, 10).is_err());
        assert_eq!(it.out_source_stock, 0);
        check_invariants(&it).unwrap();
    }

    #[test]
    fn test_largest_decrease_clamps_without_overflow() {
        let mut it = item(10, 5);
        let applied = apply_adjustment(&mut it, -i64::MAX, i64::MIN).unwrap();
        assert_eq!((it.in_house_stock, it.out_source_stock, it.quantity), (0, 0, 0));
        assert_eq!(applied.net(), -15);
        assert_eq!(applied.magnitude(), 15);
    }

    #[test]
    fn test_magnitude_never_panics() {
        let extreme = AppliedAdjustment { in_house: i64::MIN, out_source: -5 };
        assert_eq!(extreme.magnitude(), i64::MAX);
    }

    #[test]
    fn test_offsetting_adjustment_is_a_reclassification() {
        let mut it = item(5, 5);
        let applied = apply_adjustment(&mut it, 3, -3).unwrap();
        assert!(applied.is_noop());
        assert!(applied.is_reclassification());
        assert!(!AppliedAdjustment::default().is_reclassification());
    }

    #[test]
    fn test_zero_adjustment_is_noop() {
        let mut it = item(3, 3);
        assert!(apply_adjustment(&mut it, 0, 0).unwrap().is_noop());
        assert_eq!(it.quantity, 6);
    }

    #[test]
    fn test_validate_transfer_order() {
        // Same location wins even with a bad quantity
        assert_eq!(validate_transfer("001", "001", 0), Err(StockError::SameLocation));
        assert_eq!(
            validate_transfer("001", "002", 0),
            Err(StockError::NonPositiveQuantity { field: "quantity" })
        );
        assert!(validate_transfer("001", "002", 1).is_ok());
    }

    #[test]
    fn test_withdraw_only_touches_in_house() {
        let mut it = item(5, 50);
        let err = withdraw_in_house(&mut it, 6).unwrap_err();
        assert!(matches!(err, StockError::InsufficientStock { available: 5, requested: 6, .. }));
        assert_eq!(it.in_house_stock, 5);

        withdraw_in_house(&mut it, 5).unwrap();
        assert_eq!((it.in_house_stock, it.out_source_stock, it.quantity), (0, 50, 50));
    }

    #[test]
    fn test_deposit_overflow_is_rejected() {
        let mut it = item(i64::MAX, 0);
        it.quantity = i64::MAX;
        assert!(matches!(
            deposit_in_house(&mut it, 1),
            Err(StockError::QuantityOverflow { .. })
        ));
    }

    #[test]
    fn test_receive_requires_positive_total() {
        let mut it = item(0, 0);
        assert!(receive_into(&mut it, 0, 0).is_err());
        assert!(receive_into(&mut it, -1, 5).is_err());
        receive_into(&mut it, 2, 3).unwrap();
        assert_eq!(it.quantity, 5);
    }

    #[test]
    fn test_check_invariants_detects_drift() {
        let mut it = item(4, 4);
        assert!(check_invariants(&it).is_ok());
        it.quantity = 7;
        assert!(check_invariants(&it).is_err());

        let mut huge = item(0, 1);
        huge.in_house_stock = i64::MAX;
        assert!(matches!(
            check_invariants(&huge),
            Err(StockError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_notes() {
        assert_eq!(adjustment_note(5), "Stock increased by 5 units");
        assert_eq!(adjustment_note(-3), "Stock decreased by 3 units");
        assert_eq!(transfer_remark("001", "ITM-0001"), "Transferred from 001 (ITM-0001)");
    }
}
