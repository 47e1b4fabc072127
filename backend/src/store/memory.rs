//! In-process store for local runs and tests
//!
//! A unit of work holds the state lock for its whole lifetime and works on a
//! staged copy, which replaces the live state only on commit. This serializes
//! all writers, which is stronger than the per-record guarantee required.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    highest_sequence, CodePrefix, InventoryFilter, InventoryItem, ProductIdentity, Sale,
    StockMovement,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{InventoryStore, InventoryTx};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    items: BTreeMap<String, InventoryItem>,
    movements: Vec<StockMovement>,
    sales: Vec<Sale>,
    sequences: HashMap<CodePrefix, u64>,
}

/// Write step at which every unit of work from a store fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    InsertItem,
    UpdateItem,
    AppendMovement,
    InsertSale,
    Commit,
}

#[derive(Clone, Default)]
pub struct MemoryInventoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_at: Option<FailPoint>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle on the same state whose units of work fail at `point`
    #[cfg(test)]
    pub fn failing_at(&self, point: FailPoint) -> Self {
        Self {
            state: self.state.clone(),
            fail_at: Some(point),
        }
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn begin(&self) -> AppResult<Box<dyn InventoryTx>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            staged,
            fail_at: self.fail_at,
        }))
    }

    async fn find_item(&self, item_code: &str) -> AppResult<Option<InventoryItem>> {
        let state = self.state.lock().await;
        Ok(state.items.get(item_code).cloned())
    }

    async fn list_items(&self, filter: &InventoryFilter) -> AppResult<Vec<InventoryItem>> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    async fn list_movements(&self, item_code: &str) -> AppResult<Vec<StockMovement>> {
        let state = self.state.lock().await;
        Ok(state
            .movements
            .iter()
            .rev()
            .filter(|m| m.item_code == item_code)
            .cloned()
            .collect())
    }

    async fn list_sales(&self, shop_code: Option<&str>) -> AppResult<Vec<Sale>> {
        let state = self.state.lock().await;
        Ok(state
            .sales
            .iter()
            .rev()
            .filter(|s| shop_code.map_or(true, |shop| s.shop_code == shop))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    fail_at: Option<FailPoint>,
}

impl MemoryTx {
    fn check_fault(&self, point: FailPoint) -> AppResult<()> {
        if self.fail_at == Some(point) {
            return Err(AppError::Persistence(format!("injected failure at {:?}", point)));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryTx for MemoryTx {
    async fn lock_active_item(&mut self, item_code: &str) -> AppResult<Option<InventoryItem>> {
        Ok(self
            .staged
            .items
            .get(item_code)
            .filter(|item| item.is_active)
            .cloned())
    }

    async fn lock_active_by_identity(
        &mut self,
        identity: &ProductIdentity,
        location_code: &str,
    ) -> AppResult<Option<InventoryItem>> {
        Ok(self
            .staged
            .items
            .values()
            .find(|item| {
                item.is_active
                    && item.location_code == location_code
                    && item.matches_identity(identity)
            })
            .cloned())
    }

    async fn insert_item(&mut self, item: &InventoryItem) -> AppResult<()> {
        self.check_fault(FailPoint::InsertItem)?;

        if self.staged.items.contains_key(&item.item_code) {
            return Err(AppError::Conflict {
                resource: "inventory_items_pkey".to_string(),
                message: format!("Item code {} is already taken", item.item_code),
            });
        }
        let identity = item.identity();
        let duplicate = item.is_active
            && self.staged.items.values().any(|existing| {
                existing.is_active
                    && existing.location_code == item.location_code
                    && existing.matches_identity(&identity)
            });
        if duplicate {
            return Err(AppError::Conflict {
                resource: "inventory_items_identity_location_key".to_string(),
                message: format!(
                    "An active record for this product already exists at {}",
                    item.location_code
                ),
            });
        }

        self.staged.items.insert(item.item_code.clone(), item.clone());
        Ok(())
    }

    async fn update_item(&mut self, item: &InventoryItem) -> AppResult<()> {
        self.check_fault(FailPoint::UpdateItem)?;

        match self.staged.items.get_mut(&item.item_code) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Item {}", item.item_code))),
        }
    }

    async fn append_movement(&mut self, movement: &StockMovement) -> AppResult<()> {
        self.check_fault(FailPoint::AppendMovement)?;
        self.staged.movements.push(movement.clone());
        Ok(())
    }

    async fn insert_sale(&mut self, sale: &Sale) -> AppResult<()> {
        self.check_fault(FailPoint::InsertSale)?;

        if self.staged.sales.iter().any(|s| s.sale_id == sale.sale_id) {
            return Err(AppError::Conflict {
                resource: "sales_pkey".to_string(),
                message: format!("Sale id {} is already taken", sale.sale_id),
            });
        }
        self.staged.sales.push(sale.clone());
        Ok(())
    }

    async fn next_sequence(&mut self, prefix: CodePrefix) -> AppResult<u64> {
        let state = &mut self.staged;
        if !state.sequences.contains_key(&prefix) {
            let seed = match prefix {
                CodePrefix::Item => {
                    highest_sequence(prefix, state.items.keys().map(String::as_str))
                }
                CodePrefix::Sale => {
                    highest_sequence(prefix, state.sales.iter().map(|s| s.sale_id.as_str()))
                }
                _ => 0,
            };
            state.sequences.insert(prefix, seed);
        }

        let counter = state.sequences.entry(prefix).or_default();
        *counter += 1;
        Ok(*counter)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.check_fault(FailPoint::Commit)?;
        let MemoryTx {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }
}
