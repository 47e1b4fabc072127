//! PostgreSQL store backed by sqlx transactions
//!
//! Rows read through a unit of work are taken with `SELECT ... FOR UPDATE`,
//! so a stock check and the write that depends on it cannot interleave with
//! another writer on the same record. Two units of work racing to create the
//! same destination record are separated by the partial unique index on
//! (identity, location), which surfaces as `AppError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    highest_sequence, CodePrefix, InventoryFilter, InventoryItem, MovementStatus, MovementType,
    ProductIdentity, Sale, Size, StockMovement,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{InventoryStore, InventoryTx};
use crate::error::{AppError, AppResult};

const ITEM_COLUMNS: &str = "item_code, collection_name, design_name, color, size, vendor_name, \
     supplier_name, cost_price, selling_price, remarks, location_code, in_house_stock, \
     out_source_stock, quantity, quantity_sold, is_active, received_by, updated_by, \
     created_at, last_updated";

const MOVEMENT_COLUMNS: &str = "id, item_code, movement_type, from_location_code, \
     to_location_code, quantity, processed_by, movement_date, notes, reference_number, status";

const SALE_COLUMNS: &str = "sale_id, item_code, shop_code, quantity_sold, unit_price, \
     total_amount, sold_by, customer_name, notes, sale_date";

/// Row for inventory item queries
#[derive(Debug, FromRow)]
struct ItemRow {
    item_code: String,
    collection_name: String,
    design_name: String,
    color: String,
    size: String,
    vendor_name: String,
    supplier_name: Option<String>,
    cost_price: Decimal,
    selling_price: Decimal,
    remarks: Option<String>,
    location_code: String,
    in_house_stock: i64,
    out_source_stock: i64,
    quantity: i64,
    quantity_sold: i64,
    is_active: bool,
    received_by: String,
    updated_by: String,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl TryFrom<ItemRow> for InventoryItem {
    type Error = AppError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let size = Size::from_str(&row.size).ok_or_else(|| {
            AppError::Internal(format!("Unknown size {} on {}", row.size, row.item_code))
        })?;
        Ok(InventoryItem {
            item_code: row.item_code,
            collection_name: row.collection_name,
            design_name: row.design_name,
            color: row.color,
            size,
            vendor_name: row.vendor_name,
            supplier_name: row.supplier_name,
            cost_price: row.cost_price,
            selling_price: row.selling_price,
            remarks: row.remarks,
            location_code: row.location_code,
            in_house_stock: row.in_house_stock,
            out_source_stock: row.out_source_stock,
            quantity: row.quantity,
            quantity_sold: row.quantity_sold,
            is_active: row.is_active,
            received_by: row.received_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            last_updated: row.last_updated,
        })
    }
}

/// Row for ledger queries
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    item_code: String,
    movement_type: String,
    from_location_code: Option<String>,
    to_location_code: Option<String>,
    quantity: i64,
    processed_by: String,
    movement_date: DateTime<Utc>,
    notes: Option<String>,
    reference_number: Option<String>,
    status: String,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let movement_type = MovementType::from_str(&row.movement_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown movement type {}", row.movement_type))
        })?;
        let status = MovementStatus::from_str(&row.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown movement status {}", row.status)))?;
        Ok(StockMovement {
            id: row.id,
            item_code: row.item_code,
            movement_type,
            from_location_code: row.from_location_code,
            to_location_code: row.to_location_code,
            quantity: row.quantity,
            processed_by: row.processed_by,
            movement_date: row.movement_date,
            notes: row.notes,
            reference_number: row.reference_number,
            status,
        })
    }
}

/// Row for sale queries
#[derive(Debug, FromRow)]
struct SaleRow {
    sale_id: String,
    item_code: String,
    shop_code: String,
    quantity_sold: i64,
    unit_price: Decimal,
    total_amount: Decimal,
    sold_by: String,
    customer_name: Option<String>,
    notes: Option<String>,
    sale_date: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            sale_id: row.sale_id,
            item_code: row.item_code,
            shop_code: row.shop_code,
            quantity_sold: row.quantity_sold,
            unit_price: row.unit_price,
            total_amount: row.total_amount,
            sold_by: row.sold_by,
            customer_name: row.customer_name,
            notes: row.notes,
            sale_date: row.sale_date,
        }
    }
}

/// Store over a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgInventoryStore {
    db: PgPool,
}

impl PgInventoryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn begin(&self) -> AppResult<Box<dyn InventoryTx>> {
        let tx = self.db.begin().await?;
        Ok(Box::new(PgInventoryTx { tx }))
    }

    async fn find_item(&self, item_code: &str) -> AppResult<Option<InventoryItem>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM inventory_items WHERE item_code = $1",
            ITEM_COLUMNS
        ))
        .bind(item_code)
        .fetch_optional(&self.db)
        .await?;

        row.map(InventoryItem::try_from).transpose()
    }

    async fn list_items(&self, filter: &InventoryFilter) -> AppResult<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            SELECT {}
            FROM inventory_items
            WHERE ($1::VARCHAR IS NULL OR location_code = $1)
              AND ($2 OR is_active)
            ORDER BY item_code
            "#,
            ITEM_COLUMNS
        ))
        .bind(&filter.location)
        .bind(filter.include_inactive)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(InventoryItem::try_from).collect()
    }

    async fn list_movements(&self, item_code: &str) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            SELECT {}
            FROM stock_movements
            WHERE item_code = $1
            ORDER BY movement_date DESC, seq DESC
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(item_code)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockMovement::try_from).collect()
    }

    async fn list_sales(&self, shop_code: Option<&str>) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            SELECT {}
            FROM sales
            WHERE ($1::VARCHAR IS NULL OR shop_code = $1)
            ORDER BY sale_date DESC, sale_id DESC
            "#,
            SALE_COLUMNS
        ))
        .bind(shop_code)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Sale::from).collect())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}

struct PgInventoryTx {
    tx: Transaction<'static, Postgres>,
}

impl PgInventoryTx {
    /// Highest code already in use for `prefix`, used to seed a new counter
    async fn existing_sequence(&mut self, prefix: CodePrefix) -> AppResult<u64> {
        let pattern = format!("{}-%", prefix.as_str());
        let codes: Vec<String> = match prefix {
            CodePrefix::Item => {
                sqlx::query_scalar("SELECT item_code FROM inventory_items WHERE item_code LIKE $1")
                    .bind(&pattern)
                    .fetch_all(&mut *self.tx)
                    .await?
            }
            CodePrefix::Sale => {
                sqlx::query_scalar("SELECT sale_id FROM sales WHERE sale_id LIKE $1")
                    .bind(&pattern)
                    .fetch_all(&mut *self.tx)
                    .await?
            }
            _ => Vec::new(),
        };
        Ok(highest_sequence(prefix, codes.iter().map(String::as_str)))
    }
}

#[async_trait]
impl InventoryTx for PgInventoryTx {
    async fn lock_active_item(&mut self, item_code: &str) -> AppResult<Option<InventoryItem>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM inventory_items WHERE item_code = $1 AND is_active FOR UPDATE",
            ITEM_COLUMNS
        ))
        .bind(item_code)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(InventoryItem::try_from).transpose()
    }

    async fn lock_active_by_identity(
        &mut self,
        identity: &ProductIdentity,
        location_code: &str,
    ) -> AppResult<Option<InventoryItem>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            SELECT {}
            FROM inventory_items
            WHERE collection_name = $1 AND design_name = $2 AND color = $3 AND size = $4
              AND location_code = $5 AND is_active
            FOR UPDATE
            "#,
            ITEM_COLUMNS
        ))
        .bind(&identity.collection_name)
        .bind(&identity.design_name)
        .bind(&identity.color)
        .bind(identity.size.as_str())
        .bind(location_code)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(InventoryItem::try_from).transpose()
    }

    async fn insert_item(&mut self, item: &InventoryItem) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory_items (
                item_code, collection_name, design_name, color, size, vendor_name,
                supplier_name, cost_price, selling_price, remarks, location_code,
                in_house_stock, out_source_stock, quantity, quantity_sold, is_active,
                received_by, updated_by, created_at, last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(&item.item_code)
        .bind(&item.collection_name)
        .bind(&item.design_name)
        .bind(&item.color)
        .bind(item.size.as_str())
        .bind(&item.vendor_name)
        .bind(&item.supplier_name)
        .bind(item.cost_price)
        .bind(item.selling_price)
        .bind(&item.remarks)
        .bind(&item.location_code)
        .bind(item.in_house_stock)
        .bind(item.out_source_stock)
        .bind(item.quantity)
        .bind(item.quantity_sold)
        .bind(item.is_active)
        .bind(&item.received_by)
        .bind(&item.updated_by)
        .bind(item.created_at)
        .bind(item.last_updated)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_item(&mut self, item: &InventoryItem) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE inventory_items
            SET in_house_stock = $1, out_source_stock = $2, quantity = $3, quantity_sold = $4,
                is_active = $5, remarks = $6, updated_by = $7, last_updated = $8
            WHERE item_code = $9
            "#,
        )
        .bind(item.in_house_stock)
        .bind(item.out_source_stock)
        .bind(item.quantity)
        .bind(item.quantity_sold)
        .bind(item.is_active)
        .bind(&item.remarks)
        .bind(&item.updated_by)
        .bind(item.last_updated)
        .bind(&item.item_code)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item {}", item.item_code)));
        }
        Ok(())
    }

    async fn append_movement(&mut self, movement: &StockMovement) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, item_code, movement_type, from_location_code, to_location_code, quantity,
                processed_by, movement_date, notes, reference_number, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(movement.id)
        .bind(&movement.item_code)
        .bind(movement.movement_type.as_str())
        .bind(&movement.from_location_code)
        .bind(&movement.to_location_code)
        .bind(movement.quantity)
        .bind(&movement.processed_by)
        .bind(movement.movement_date)
        .bind(&movement.notes)
        .bind(&movement.reference_number)
        .bind(movement.status.as_str())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn insert_sale(&mut self, sale: &Sale) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sales (
                sale_id, item_code, shop_code, quantity_sold, unit_price, total_amount,
                sold_by, customer_name, notes, sale_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&sale.sale_id)
        .bind(&sale.item_code)
        .bind(&sale.shop_code)
        .bind(sale.quantity_sold)
        .bind(sale.unit_price)
        .bind(sale.total_amount)
        .bind(&sale.sold_by)
        .bind(&sale.customer_name)
        .bind(&sale.notes)
        .bind(sale.sale_date)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn next_sequence(&mut self, prefix: CodePrefix) -> AppResult<u64> {
        let current: Option<i64> =
            sqlx::query_scalar("SELECT last_value FROM code_sequences WHERE prefix = $1 FOR UPDATE")
                .bind(prefix.as_str())
                .fetch_optional(&mut *self.tx)
                .await?;

        let seed = match current {
            Some(_) => 0,
            None => self.existing_sequence(prefix).await?,
        };
        let seed = i64::try_from(seed)
            .map_err(|_| AppError::Internal(format!("{} sequence out of range", prefix)))?;

        // A concurrent first use of the prefix lands on the conflict arm and
        // still receives a distinct value.
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO code_sequences (prefix, last_value)
            VALUES ($1, $2 + 1)
            ON CONFLICT (prefix) DO UPDATE SET last_value = code_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(prefix.as_str())
        .bind(seed)
        .fetch_one(&mut *self.tx)
        .await?;

        u64::try_from(value)
            .map_err(|_| AppError::Internal(format!("{} sequence out of range", prefix)))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
