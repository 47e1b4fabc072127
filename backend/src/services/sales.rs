//! Sales service
//!
//! A sale draws down in-house stock at a shop and is recorded in the movement
//! ledger as a `sold` entry, all in one unit of work.

use std::sync::Arc;

use chrono::Utc;
use shared::{
    checked_sale_total, validate_price, withdraw_in_house, CodePrefix, MovementType, RecordSaleRequest, Sale,
    StockError, StockMovement, CUSTOMER_ENDPOINT,
};
use validator::Validate;

use crate::config::InventoryConfig;
use crate::error::{AppError, AppResult};
use crate::services::code_generator::generate_next_code;
use crate::store::InventoryStore;

/// Service for shop sales
#[derive(Clone)]
pub struct SalesService {
    store: Arc<dyn InventoryStore>,
    inventory: InventoryConfig,
}

impl SalesService {
    pub fn new(store: Arc<dyn InventoryStore>, inventory: InventoryConfig) -> Self {
        Self { store, inventory }
    }

    /// Record a sale of in-house stock at a shop
    pub async fn record_sale(&self, input: RecordSaleRequest) -> AppResult<Sale> {
        input.validate()?;
        if !self.inventory.is_stock_location(&input.shop_code) {
            return Err(AppError::validation(
                "shopCode",
                format!("Unknown location code {}", input.shop_code),
            ));
        }
        if input.shop_code == self.inventory.warehouse_code {
            return Err(AppError::validation(
                "shopCode",
                "Sales are recorded at shops, not at the warehouse",
            ));
        }
        if let Some(price) = input.unit_price {
            validate_price(price).map_err(|m| AppError::validation("unitPrice", m))?;
        }

        let now = Utc::now();
        let actor = input.sold_by.trim();

        let mut tx = self.store.begin().await?;

        let mut item = tx
            .lock_active_item(&input.item_code)
            .await?
            .filter(|item| item.location_code == input.shop_code)
            .ok_or_else(|| {
                AppError::NotFound(format!("Item {} at {}", input.item_code, input.shop_code))
            })?;

        withdraw_in_house(&mut item, input.quantity_sold)?;
        item.quantity_sold = item
            .quantity_sold
            .checked_add(input.quantity_sold)
            .ok_or_else(|| StockError::QuantityOverflow {
                item_code: item.item_code.clone(),
            })?;
        item.stamp(actor, now);
        tx.update_item(&item).await?;

        let sale_id = generate_next_code(tx.as_mut(), CodePrefix::Sale).await?;
        let unit_price = input.unit_price.unwrap_or(item.selling_price);
        let total_amount = checked_sale_total(unit_price, input.quantity_sold)
            .map_err(|m| AppError::validation("unitPrice", m))?;
        let sale = Sale {
            sale_id,
            item_code: item.item_code.clone(),
            shop_code: input.shop_code.clone(),
            quantity_sold: input.quantity_sold,
            unit_price,
            total_amount,
            sold_by: actor.to_string(),
            customer_name: input.customer_name,
            notes: input.notes.clone(),
            sale_date: now,
        };
        tx.insert_sale(&sale).await?;

        let notes = input
            .notes
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Sold {} units", input.quantity_sold));
        let movement = StockMovement::completed(
            &item.item_code,
            MovementType::Sold,
            input.quantity_sold,
            actor,
            now,
        )
        .between(Some(input.shop_code.as_str()), Some(CUSTOMER_ENDPOINT))
        .with_notes(notes)
        .with_reference(sale.sale_id.clone());
        tx.append_movement(&movement).await?;

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.sale_id,
            item_code = %sale.item_code,
            shop = %sale.shop_code,
            quantity = sale.quantity_sold,
            "Sale recorded"
        );

        Ok(sale)
    }

    /// Sales newest first, optionally for one shop
    pub async fn list_sales(&self, shop_code: Option<&str>) -> AppResult<Vec<Sale>> {
        self.store.list_sales(shop_code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InventoryService;
    use crate::store::memory::FailPoint;
    use crate::store::MemoryInventoryStore;
    use rust_decimal::Decimal;
    use shared::{ReceiveStockRequest, Size, MAX_PRICE};

    fn sale(item_code: &str, shop: &str, quantity: i64) -> RecordSaleRequest {
        RecordSaleRequest {
            item_code: item_code.to_string(),
            shop_code: shop.to_string(),
            quantity_sold: quantity,
            unit_price: None,
            sold_by: "erin".to_string(),
            customer_name: Some("Walk-in".to_string()),
            notes: None,
        }
    }

    async fn stocked_shop(store: &MemoryInventoryStore, in_house: i64, out_source: i64) {
        let inventory = InventoryService::new(Arc::new(store.clone()), InventoryConfig::default());
        inventory
            .receive_stock(ReceiveStockRequest {
                collection_name: "Festive".to_string(),
                design_name: "Silk Saree".to_string(),
                color: "Red".to_string(),
                size: Size::L,
                vendor_name: "Loom House".to_string(),
                supplier_name: None,
                cost_price: Decimal::new(2500, 0),
                selling_price: Decimal::new(3999, 0),
                remarks: None,
                location_code: "002".to_string(),
                in_house_stock: in_house,
                out_source_stock: out_source,
                received_by: "alice".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sale_decrements_in_house_and_logs_movement() {
        let store = MemoryInventoryStore::new();
        stocked_shop(&store, 8, 4).await;
        let sales = SalesService::new(Arc::new(store.clone()), InventoryConfig::default());

        let recorded = sales.record_sale(sale("ITM-0001", "002", 3)).await.unwrap();
        assert_eq!(recorded.sale_id, "SALE-0001");
        assert_eq!(recorded.unit_price, Decimal::new(3999, 0));
        assert_eq!(recorded.total_amount, Decimal::new(11997, 0));

        let item = store.find_item("ITM-0001").await.unwrap().unwrap();
        assert_eq!((item.in_house_stock, item.out_source_stock, item.quantity), (5, 4, 9));
        assert_eq!(item.quantity_sold, 3);

        let movements = store.list_movements("ITM-0001").await.unwrap();
        let sold = &movements[0];
        assert_eq!(sold.movement_type, MovementType::Sold);
        assert_eq!(sold.quantity, 3);
        assert_eq!(sold.from_location_code.as_deref(), Some("002"));
        assert_eq!(sold.to_location_code.as_deref(), Some(CUSTOMER_ENDPOINT));
        assert_eq!(sold.reference_number.as_deref(), Some("SALE-0001"));
    }

    #[tokio::test]
    async fn test_sale_cannot_draw_out_source_stock() {
        let store = MemoryInventoryStore::new();
        stocked_shop(&store, 2, 50).await;
        let sales = SalesService::new(Arc::new(store.clone()), InventoryConfig::default());

        let err = sales.record_sale(sale("ITM-0001", "002", 3)).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(_)));
        assert!(sales.list_sales(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sale_at_other_shop_is_not_found() {
        let store = MemoryInventoryStore::new();
        stocked_shop(&store, 5, 0).await;
        let sales = SalesService::new(Arc::new(store.clone()), InventoryConfig::default());

        let err = sales.record_sale(sale("ITM-0001", "003", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = sales.record_sale(sale("ITM-0001", "001", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unit_price_beyond_schema_range_is_rejected() {
        let store = MemoryInventoryStore::new();
        stocked_shop(&store, 5, 0).await;
        let sales = SalesService::new(Arc::new(store.clone()), InventoryConfig::default());

        let mut request = sale("ITM-0001", "002", 2);
        request.unit_price = Some(Decimal::MAX);
        let err = sales.record_sale(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "unitPrice"));
    }

    #[tokio::test]
    async fn test_total_too_large_to_store_is_rejected_untouched() {
        let store = MemoryInventoryStore::new();
        stocked_shop(&store, 500, 0).await;
        let sales = SalesService::new(Arc::new(store.clone()), InventoryConfig::default());

        let mut request = sale("ITM-0001", "002", 200);
        request.unit_price = Some(MAX_PRICE);
        let err = sales.record_sale(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "unitPrice"));

        let item = store.find_item("ITM-0001").await.unwrap().unwrap();
        assert_eq!((item.in_house_stock, item.quantity_sold), (500, 0));
        assert!(sales.list_sales(None).await.unwrap().is_empty());
        assert_eq!(store.list_movements("ITM-0001").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_sale_rolls_back_stock() {
        let store = MemoryInventoryStore::new();
        stocked_shop(&store, 5, 0).await;
        let failing = SalesService::new(
            Arc::new(store.failing_at(FailPoint::InsertSale)),
            InventoryConfig::default(),
        );

        assert!(failing.record_sale(sale("ITM-0001", "002", 2)).await.is_err());

        let item = store.find_item("ITM-0001").await.unwrap().unwrap();
        assert_eq!(item.in_house_stock, 5);
        assert_eq!(item.quantity_sold, 0);
    }

    #[tokio::test]
    async fn test_list_sales_by_shop() {
        let store = MemoryInventoryStore::new();
        stocked_shop(&store, 10, 0).await;
        let sales = SalesService::new(Arc::new(store.clone()), InventoryConfig::default());

        sales.record_sale(sale("ITM-0001", "002", 1)).await.unwrap();
        sales.record_sale(sale("ITM-0001", "002", 2)).await.unwrap();

        let listed = sales.list_sales(Some("002")).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].sale_id, "SALE-0002");
        assert!(sales.list_sales(Some("003")).await.unwrap().is_empty());
    }
}
