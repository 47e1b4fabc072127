//! Sequential code generation backed by per-prefix counters
//!
//! Counters live in the store and are advanced inside a unit of work, so two
//! concurrent callers never observe the same value.

use std::sync::Arc;

use shared::{format_code, CodePrefix};

use crate::error::AppResult;
use crate::store::{InventoryStore, InventoryTx};

/// Draw the next code for `prefix` inside an open unit of work.
///
/// The counter advance is rolled back with the unit of work, so an aborted
/// operation does not burn a code.
pub async fn generate_next_code(tx: &mut dyn InventoryTx, prefix: CodePrefix) -> AppResult<String> {
    let n = tx.next_sequence(prefix).await?;
    Ok(format_code(prefix, n))
}

/// Code generator for callers outside an operation (e.g. dashboard forms
/// reserving an employee or product code)
#[derive(Clone)]
pub struct CodeGenerator {
    store: Arc<dyn InventoryStore>,
}

impl CodeGenerator {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Reserve the next code for `prefix` in its own unit of work
    pub async fn generate_next_code(&self, prefix: CodePrefix) -> AppResult<String> {
        let mut tx = self.store.begin().await?;
        let code = generate_next_code(tx.as_mut(), prefix).await?;
        tx.commit().await?;

        tracing::debug!(%prefix, %code, "Reserved code");
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryInventoryStore;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_first_code_per_prefix() {
        let generator = CodeGenerator::new(Arc::new(MemoryInventoryStore::new()));
        assert_eq!(generator.generate_next_code(CodePrefix::Employee).await.unwrap(), "EMP-0001");
        assert_eq!(generator.generate_next_code(CodePrefix::Employee).await.unwrap(), "EMP-0002");
        assert_eq!(generator.generate_next_code(CodePrefix::Product).await.unwrap(), "PRD-0001");
    }

    #[tokio::test]
    async fn test_concurrent_generation_yields_distinct_sequential_codes() {
        let generator = CodeGenerator::new(Arc::new(MemoryInventoryStore::new()));
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let generator = generator.clone();
                tokio::spawn(async move { generator.generate_next_code(CodePrefix::Article).await })
            })
            .collect();

        let mut codes = HashSet::new();
        for handle in handles {
            let code = handle.await.unwrap().unwrap();
            assert!(codes.insert(code), "duplicate code generated");
        }

        let expected: HashSet<String> = (1..=32).map(|n| format_code(CodePrefix::Article, n)).collect();
        assert_eq!(codes, expected);
    }

    #[tokio::test]
    async fn test_rolled_back_draw_is_reused() {
        let store = Arc::new(MemoryInventoryStore::new());
        {
            let mut tx = store.begin().await.unwrap();
            assert_eq!(
                generate_next_code(tx.as_mut(), CodePrefix::Material).await.unwrap(),
                "MAT-0001"
            );
            // dropped without commit
        }
        let generator = CodeGenerator::new(store);
        assert_eq!(generator.generate_next_code(CodePrefix::Material).await.unwrap(), "MAT-0001");
    }
}
