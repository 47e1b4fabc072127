//! Inventory service
//!
//! Receipts, manual adjustments and location-to-location transfers. Every
//! mutating operation runs inside a single unit of work, so a failure at any
//! step leaves records and the movement ledger exactly as they were.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    adjustment_note, apply_adjustment, deposit_in_house, receive_into, transfer_note,
    transfer_remark, validate_price, validate_transfer, withdraw_in_house, AdjustStockRequest,
    CodePrefix, InventoryFilter, InventoryItem, MovementType, ProductIdentity,
    ReceiveStockRequest, StockError, StockMovement, TransferStockRequest, CUSTOMER_ENDPOINT,
    VENDOR_ENDPOINT,
};
use uuid::Uuid;
use validator::Validate;

use crate::config::InventoryConfig;
use crate::error::{AppError, AppResult};
use crate::services::code_generator::generate_next_code;
use crate::store::{InventoryStore, InventoryTx};

/// Record after an adjustment plus the ledger entry, if the net change was non-zero
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentResult {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub movement: Option<StockMovement>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub source_item: InventoryItem,
    pub destination_item: InventoryItem,
    pub movement: StockMovement,
}

/// Destination record of a transfer and whether it was minted for it
#[derive(Debug, Clone)]
pub struct DestinationResolution {
    pub item: InventoryItem,
    pub created: bool,
}

/// Service for inventory records and their movements
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    inventory: InventoryConfig,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>, inventory: InventoryConfig) -> Self {
        Self { store, inventory }
    }

    fn require_location(&self, field: &str, code: &str) -> AppResult<()> {
        if !self.inventory.is_stock_location(code) {
            return Err(AppError::validation(
                field,
                format!("Unknown location code {}", code),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Receipts
    // ========================================================================

    /// Receive vendor stock at a location.
    ///
    /// Quantities are added to the active record for the same product at that
    /// location, or a new `ITM-` record is minted.
    pub async fn receive_stock(&self, input: ReceiveStockRequest) -> AppResult<InventoryItem> {
        input.validate()?;
        self.require_location("locationCode", &input.location_code)?;
        validate_price(input.cost_price).map_err(|m| AppError::validation("costPrice", m))?;
        validate_price(input.selling_price)
            .map_err(|m| AppError::validation("sellingPrice", m))?;

        let received = input.in_house_stock.saturating_add(input.out_source_stock);
        if received < 1 {
            return Err(StockError::NonPositiveQuantity {
                field: "received quantity",
            }
            .into());
        }

        let now = Utc::now();
        let actor = input.received_by.trim();
        let identity = ProductIdentity {
            collection_name: input.collection_name.trim().to_string(),
            design_name: input.design_name.trim().to_string(),
            color: input.color.trim().to_string(),
            size: input.size,
        };

        let mut tx = self.store.begin().await?;

        let existing = tx
            .lock_active_by_identity(&identity, &input.location_code)
            .await?;

        let (item, created) = match existing {
            Some(mut existing) => {
                receive_into(&mut existing, input.in_house_stock, input.out_source_stock)?;
                existing.stamp(actor, now);
                tx.update_item(&existing).await?;
                (existing, false)
            }
            None => {
                let item_code = generate_next_code(tx.as_mut(), CodePrefix::Item).await?;
                let mut item = InventoryItem {
                    item_code,
                    collection_name: identity.collection_name,
                    design_name: identity.design_name,
                    color: identity.color,
                    size: identity.size,
                    vendor_name: input.vendor_name.trim().to_string(),
                    supplier_name: input.supplier_name,
                    cost_price: input.cost_price,
                    selling_price: input.selling_price,
                    remarks: input.remarks,
                    location_code: input.location_code.clone(),
                    in_house_stock: 0,
                    out_source_stock: 0,
                    quantity: 0,
                    quantity_sold: 0,
                    is_active: true,
                    received_by: actor.to_string(),
                    updated_by: actor.to_string(),
                    created_at: now,
                    last_updated: now,
                };
                receive_into(&mut item, input.in_house_stock, input.out_source_stock)?;
                tx.insert_item(&item).await?;
                (item, true)
            }
        };

        let movement = StockMovement::completed(
            &item.item_code,
            MovementType::Received,
            received,
            actor,
            now,
        )
        .between(Some(VENDOR_ENDPOINT), Some(item.location_code.as_str()))
        .with_notes(format!("Received {} units from {}", received, item.vendor_name));
        tx.append_movement(&movement).await?;

        tx.commit().await?;

        tracing::info!(
            item_code = %item.item_code,
            location = %item.location_code,
            quantity = received,
            created,
            "Stock received"
        );

        Ok(item)
    }

    // ========================================================================
    // Adjustments
    // ========================================================================

    /// Apply signed changes to a record's stock components.
    ///
    /// Each component is clamped at zero and the ledger records the change
    /// that was actually applied. A zero net change only touches the record;
    /// non-zero changes that cancel each other out are rejected.
    pub async fn adjust_stock(&self, input: AdjustStockRequest) -> AppResult<AdjustmentResult> {
        input.validate()?;
        let movement_type = input.movement_type.unwrap_or_default();
        if !movement_type.is_adjustable() {
            return Err(AppError::validation(
                "movementType",
                format!("{} movements cannot be recorded as adjustments", movement_type.as_str()),
            ));
        }

        let now = Utc::now();
        let actor = input.updated_by.trim();

        let mut tx = self.store.begin().await?;

        let mut item = tx
            .lock_active_item(&input.item_code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {}", input.item_code)))?;

        let applied = apply_adjustment(&mut item, input.in_house_change, input.out_source_change)?;
        if applied.is_reclassification() {
            return Err(AppError::validation(
                "outSourceChange",
                "Changes that cancel out would move stock between in-house and out-source \
                 without a ledger entry; record them as separate adjustments",
            ));
        }
        item.stamp(actor, now);
        tx.update_item(&item).await?;

        let movement = if applied.is_noop() {
            None
        } else {
            let net = applied.net();
            let (from, to) = if net > 0 {
                let origin = (movement_type == MovementType::Returned).then_some(CUSTOMER_ENDPOINT);
                (origin, Some(item.location_code.as_str()))
            } else {
                (Some(item.location_code.as_str()), None)
            };
            let notes = input
                .notes
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| adjustment_note(net));

            let movement =
                StockMovement::completed(&item.item_code, movement_type, applied.magnitude(), actor, now)
                    .between(from, to)
                    .with_notes(notes);
            tx.append_movement(&movement).await?;
            Some(movement)
        };

        tx.commit().await?;

        if applied.in_house != input.in_house_change || applied.out_source != input.out_source_change {
            tracing::warn!(
                item_code = %item.item_code,
                requested_in_house = input.in_house_change,
                requested_out_source = input.out_source_change,
                applied_in_house = applied.in_house,
                applied_out_source = applied.out_source,
                "Adjustment clamped at zero"
            );
        }
        tracing::info!(
            item_code = %item.item_code,
            location = %item.location_code,
            net = applied.net(),
            "Stock adjusted"
        );

        Ok(AdjustmentResult { item, movement })
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Move in-house stock of one record to another location.
    ///
    /// The source decrement, the destination increment (or creation) and the
    /// ledger entry commit together or not at all.
    pub async fn transfer_stock(&self, input: TransferStockRequest) -> AppResult<TransferResult> {
        validate_transfer(&input.from_location_code, &input.to_location_code, input.quantity)?;
        input.validate()?;
        self.require_location("fromLocationCode", &input.from_location_code)?;
        self.require_location("toLocationCode", &input.to_location_code)?;

        let now = Utc::now();
        let actor = input.transferred_by.trim();
        let from = input.from_location_code.as_str();
        let to = input.to_location_code.as_str();

        let mut tx = self.store.begin().await?;

        let mut source = tx
            .lock_active_item(&input.item_code)
            .await?
            .filter(|item| item.location_code == from)
            .ok_or_else(|| {
                AppError::NotFound(format!("Source item {} at {}", input.item_code, from))
            })?;

        withdraw_in_house(&mut source, input.quantity)?;
        source.stamp(actor, now);
        tx.update_item(&source).await?;

        let destination =
            resolve_or_create_destination(tx.as_mut(), &source, to, input.quantity, actor, now)
                .await?;

        let notes = input
            .notes
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| transfer_note(input.quantity, from, to));
        let movement = StockMovement::completed(
            &source.item_code,
            MovementType::Transferred,
            input.quantity,
            actor,
            now,
        )
        .between(Some(from), Some(to))
        .with_notes(notes)
        .with_reference(transfer_reference(now));
        tx.append_movement(&movement).await?;

        tx.commit().await?;

        tracing::info!(
            item_code = %source.item_code,
            from,
            to,
            quantity = input.quantity,
            destination = %destination.item.item_code,
            created = destination.created,
            "Stock transferred"
        );

        Ok(TransferResult {
            source_item: source,
            destination_item: destination.item,
            movement,
        })
    }

    // ========================================================================
    // Lifecycle and reads
    // ========================================================================

    /// Soft-delete a record. Inactive records are skipped by every mutating lookup.
    pub async fn deactivate_item(&self, item_code: &str, actor: &str) -> AppResult<InventoryItem> {
        let actor = actor.trim();
        if actor.is_empty() {
            return Err(AppError::validation("updatedBy", "must not be blank"));
        }

        let mut tx = self.store.begin().await?;
        let mut item = tx
            .lock_active_item(item_code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {}", item_code)))?;

        item.is_active = false;
        item.stamp(actor, Utc::now());
        tx.update_item(&item).await?;
        tx.commit().await?;

        tracing::info!(item_code = %item.item_code, "Item deactivated");
        Ok(item)
    }

    pub async fn get_item(&self, item_code: &str) -> AppResult<InventoryItem> {
        self.store
            .find_item(item_code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {}", item_code)))
    }

    pub async fn list_items(&self, filter: &InventoryFilter) -> AppResult<Vec<InventoryItem>> {
        self.store.list_items(filter).await
    }

    /// Ledger entries for a record, newest first
    pub async fn list_movements(&self, item_code: &str) -> AppResult<Vec<StockMovement>> {
        self.get_item(item_code).await?;
        self.store.list_movements(item_code).await
    }
}

/// Credit `quantity` to the active record for `source`'s product at `to`,
/// minting that record if the location has none.
///
/// Runs inside the caller's unit of work; the destination row stays locked
/// until it ends.
pub async fn resolve_or_create_destination(
    tx: &mut dyn InventoryTx,
    source: &InventoryItem,
    to: &str,
    quantity: i64,
    actor: &str,
    at: DateTime<Utc>,
) -> AppResult<DestinationResolution> {
    let identity = source.identity();
    if let Some(mut existing) = tx.lock_active_by_identity(&identity, to).await? {
        deposit_in_house(&mut existing, quantity)?;
        existing.stamp(actor, at);
        tx.update_item(&existing).await?;
        return Ok(DestinationResolution {
            item: existing,
            created: false,
        });
    }

    let item_code = generate_next_code(&mut *tx, CodePrefix::Item).await?;
    let mut item = InventoryItem {
        item_code,
        collection_name: source.collection_name.clone(),
        design_name: source.design_name.clone(),
        color: source.color.clone(),
        size: source.size,
        vendor_name: source.vendor_name.clone(),
        supplier_name: source.supplier_name.clone(),
        cost_price: source.cost_price,
        selling_price: source.selling_price,
        remarks: Some(transfer_remark(&source.location_code, &source.item_code)),
        location_code: to.to_string(),
        in_house_stock: 0,
        out_source_stock: 0,
        quantity: 0,
        quantity_sold: 0,
        is_active: true,
        received_by: actor.to_string(),
        updated_by: actor.to_string(),
        created_at: at,
        last_updated: at,
    };
    deposit_in_house(&mut item, quantity)?;
    tx.insert_item(&item).await?;

    tracing::debug!(item_code = %item.item_code, location = to, "Minted destination record");
    Ok(DestinationResolution {
        item,
        created: true,
    })
}

/// `TRF-<yyyymmddHHMMSS>-<6 hex>`
fn transfer_reference(at: DateTime<Utc>) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("TRF-{}-{}", at.format("%Y%m%d%H%M%S"), token[..6].to_uppercase())
}
