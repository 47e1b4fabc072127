//! Persistence for inventory records, the movement ledger and sales
//!
//! All writes happen inside a unit of work obtained from
//! [`InventoryStore::begin`]. A unit of work either commits every write it
//! staged or none of them: dropping it without calling
//! [`InventoryTx::commit`] rolls everything back.

use async_trait::async_trait;
use shared::{CodePrefix, InventoryFilter, InventoryItem, ProductIdentity, Sale, StockMovement};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryInventoryStore;
pub use postgres::PgInventoryStore;

/// Factory for units of work plus committed-state reads
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Open a new unit of work
    async fn begin(&self) -> AppResult<Box<dyn InventoryTx>>;

    /// Look up a record by code, active or not
    async fn find_item(&self, item_code: &str) -> AppResult<Option<InventoryItem>>;

    async fn list_items(&self, filter: &InventoryFilter) -> AppResult<Vec<InventoryItem>>;

    /// Ledger entries for one record, newest first
    async fn list_movements(&self, item_code: &str) -> AppResult<Vec<StockMovement>>;

    /// Sales, newest first, optionally limited to one shop
    async fn list_sales(&self, shop_code: Option<&str>) -> AppResult<Vec<Sale>>;

    /// Connectivity probe used by the health endpoint
    async fn ping(&self) -> AppResult<()>;
}

/// One atomic unit of work.
///
/// Reads through a unit of work lock the rows they return until the unit of
/// work ends, so a check made on a returned record still holds at commit.
#[async_trait]
pub trait InventoryTx: Send {
    /// Active record with `item_code`
    async fn lock_active_item(&mut self, item_code: &str) -> AppResult<Option<InventoryItem>>;

    /// Active record for `identity` at `location_code`
    async fn lock_active_by_identity(
        &mut self,
        identity: &ProductIdentity,
        location_code: &str,
    ) -> AppResult<Option<InventoryItem>>;

    /// Insert a new record; fails with `Conflict` if its code or its
    /// (identity, location) pair is already taken by an active record
    async fn insert_item(&mut self, item: &InventoryItem) -> AppResult<()>;

    /// Overwrite the mutable state of an existing record
    async fn update_item(&mut self, item: &InventoryItem) -> AppResult<()>;

    /// Append to the movement ledger
    async fn append_movement(&mut self, movement: &StockMovement) -> AppResult<()>;

    async fn insert_sale(&mut self, sale: &Sale) -> AppResult<()>;

    /// Draw the next value of the per-prefix code counter
    async fn next_sequence(&mut self, prefix: CodePrefix) -> AppResult<u64>;

    /// Make every staged write visible atomically
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
