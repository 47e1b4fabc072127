//! Stock transfer tests
//!
//! Tests for moving in-house stock between locations including:
//! - Conservation of in-house stock across source and destination
//! - Rejection of over-withdrawals without partial mutation
//! - Precondition order (same location before quantity)

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    check_invariants, deposit_in_house, transfer_note, transfer_remark, validate_transfer,
    withdraw_in_house, InventoryItem, Size, StockError,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn item(code: &str, location: &str, in_house: i64, out_source: i64) -> InventoryItem {
    let now = Utc::now();
    InventoryItem {
        item_code: code.to_string(),
        collection_name: "Winter".to_string(),
        design_name: "Wool Shawl".to_string(),
        color: "Grey".to_string(),
        size: Size::XL,
        vendor_name: "Northern Mills".to_string(),
        supplier_name: Some("Valley Traders".to_string()),
        cost_price: dec("450.00"),
        selling_price: dec("799.00"),
        remarks: None,
        location_code: location.to_string(),
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

/// Apply a transfer to a source/destination pair the way the service does
fn transfer(
    source: &mut InventoryItem,
    destination: &mut InventoryItem,
    quantity: i64,
) -> Result<(), StockError> {
    validate_transfer(&source.location_code, &destination.location_code, quantity)?;
    withdraw_in_house(source, quantity)?;
    deposit_in_house(destination, quantity)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// 25 in house, move 10 to an empty destination
    #[test]
    fn test_transfer_to_empty_destination() {
        let mut source = item("ITM-0001", "001", 25, 0);
        let mut destination = item("ITM-0002", "002", 0, 0);

        transfer(&mut source, &mut destination, 10).unwrap();

        assert_eq!(source.in_house_stock, 15);
        assert_eq!((destination.in_house_stock, destination.out_source_stock), (10, 0));
        assert_eq!(destination.identity(), source.identity());
    }

    /// Destination that already holds 5 ends with 15
    #[test]
    fn test_transfer_to_existing_destination() {
        let mut source = item("ITM-0001", "001", 25, 0);
        let mut destination = item("ITM-0007", "002", 5, 3);

        transfer(&mut source, &mut destination, 10).unwrap();

        assert_eq!(destination.in_house_stock, 15);
        assert_eq!(destination.quantity, 18);
    }

    /// Out-source stock is never transferable
    #[test]
    fn test_out_source_stock_cannot_be_transferred() {
        let mut source = item("ITM-0001", "001", 25, 100);
        let mut destination = item("ITM-0002", "002", 0, 0);

        let err = transfer(&mut source, &mut destination, 30).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientStock {
                item_code: "ITM-0001".to_string(),
                location_code: "001".to_string(),
                available: 25,
                requested: 30,
            }
        );
        assert_eq!(source.in_house_stock, 25);
        assert_eq!(destination.in_house_stock, 0);
    }

    /// Same-location check fires before the quantity check
    #[test]
    fn test_same_location_reported_first() {
        assert_eq!(validate_transfer("002", "002", -5), Err(StockError::SameLocation));
        assert_eq!(
            validate_transfer("002", "003", -5),
            Err(StockError::NonPositiveQuantity { field: "quantity" })
        );
    }

    /// Ledger note and destination remark wording
    #[test]
    fn test_transfer_texts() {
        assert_eq!(transfer_note(10, "001", "002"), "Transferred 10 units from 001 to 002");
        assert_eq!(transfer_remark("001", "ITM-0001"), "Transferred from 001 (ITM-0001)");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn stock_strategy() -> impl Strategy<Value = i64> {
        0i64..100_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// In-house stock is conserved across the pair for every valid transfer
        #[test]
        fn prop_transfer_conserves_in_house_stock(
            source_stock in stock_strategy(),
            dest_stock in stock_strategy(),
            out_source in stock_strategy(),
            quantity in 1i64..100_000,
        ) {
            prop_assume!(quantity <= source_stock);

            let mut source = item("ITM-0001", "001", source_stock, out_source);
            let mut destination = item("ITM-0002", "003", dest_stock, 0);

            transfer(&mut source, &mut destination, quantity).unwrap();

            prop_assert_eq!(
                source.in_house_stock + destination.in_house_stock,
                source_stock + dest_stock
            );
            prop_assert_eq!(source.out_source_stock, out_source);
            prop_assert!(check_invariants(&source).is_ok());
            prop_assert!(check_invariants(&destination).is_ok());
        }

        /// An over-withdrawal leaves both records untouched
        #[test]
        fn prop_failed_transfer_mutates_nothing(
            source_stock in stock_strategy(),
            dest_stock in stock_strategy(),
            excess in 1i64..1_000,
        ) {
            let mut source = item("ITM-0001", "001", source_stock, 7);
            let mut destination = item("ITM-0002", "002", dest_stock, 0);
            let (source_before, dest_before) = (source.clone(), destination.clone());

            let result = transfer(&mut source, &mut destination, source_stock + excess);

            let is_insufficient = matches!(result, Err(StockError::InsufficientStock { .. }));
            prop_assert!(is_insufficient);
            prop_assert_eq!(source, source_before);
            prop_assert_eq!(destination, dest_before);
        }

        /// Transfers to the same location are always rejected
        #[test]
        fn prop_same_location_always_rejected(quantity in -10i64..10_000) {
            prop_assert_eq!(validate_transfer("004", "004", quantity), Err(StockError::SameLocation));
        }
    }
}
