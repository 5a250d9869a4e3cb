use async_trait::async_trait;
use merx_core::inventory::{InventoryError, InventoryLedger};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Ledger backed by an in-process map. The conditional decrement runs inside
/// one write-lock critical section, which gives the same guarantee the
/// production store gets from a conditional UPDATE: no lost updates, no
/// negative stock, regardless of how many tasks race on a product.
#[derive(Default)]
pub struct MemoryInventoryLedger {
    stock: RwLock<HashMap<Uuid, i32>>,
}

impl MemoryInventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite the stock counter for a product.
    pub fn set_stock(&self, product_id: Uuid, quantity: i32) {
        let mut stock = self.stock.write().expect("inventory lock poisoned");
        stock.insert(product_id, quantity);
    }
}

#[async_trait]
impl InventoryLedger for MemoryInventoryLedger {
    async fn check_available(&self, product_id: Uuid, quantity: i32) -> Result<bool, InventoryError> {
        let stock = self.stock.read().expect("inventory lock poisoned");
        match stock.get(&product_id) {
            Some(available) => Ok(*available >= quantity),
            None => Err(InventoryError::ProductNotFound { product_id }),
        }
    }

    async fn reserve(&self, product_id: Uuid, quantity: i32) -> Result<(), InventoryError> {
        let mut stock = self.stock.write().expect("inventory lock poisoned");
        let available = stock
            .get_mut(&product_id)
            .ok_or(InventoryError::ProductNotFound { product_id })?;

        if *available < quantity {
            return Err(InventoryError::InsufficientStock {
                product_id,
                available: *available,
                requested: quantity,
            });
        }

        *available -= quantity;
        Ok(())
    }

    async fn release(&self, product_id: Uuid, quantity: i32) -> Result<(), InventoryError> {
        let mut stock = self.stock.write().expect("inventory lock poisoned");
        let available = stock
            .get_mut(&product_id)
            .ok_or(InventoryError::ProductNotFound { product_id })?;

        *available += quantity;
        Ok(())
    }

    async fn stock_level(&self, product_id: Uuid) -> Result<i32, InventoryError> {
        let stock = self.stock.read().expect("inventory lock poisoned");
        stock
            .get(&product_id)
            .copied()
            .ok_or(InventoryError::ProductNotFound { product_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn reserve_and_release_lifecycle() {
        let ledger = MemoryInventoryLedger::new();
        let product_id = Uuid::new_v4();
        ledger.set_stock(product_id, 100);

        assert!(ledger.check_available(product_id, 10).await.unwrap());
        ledger.reserve(product_id, 10).await.unwrap();
        assert_eq!(ledger.stock_level(product_id).await.unwrap(), 90);

        ledger.release(product_id, 10).await.unwrap();
        assert_eq!(ledger.stock_level(product_id).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn reserve_rejects_when_stock_is_short() {
        let ledger = MemoryInventoryLedger::new();
        let product_id = Uuid::new_v4();
        ledger.set_stock(product_id, 3);

        let err = ledger.reserve(product_id, 4).await.unwrap_err();
        match err {
            InventoryError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 3);
                assert_eq!(requested, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Nothing was deducted.
        assert_eq!(ledger.stock_level(product_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn unknown_product_is_reported() {
        let ledger = MemoryInventoryLedger::new();
        let missing = Uuid::new_v4();

        assert!(matches!(
            ledger.reserve(missing, 1).await.unwrap_err(),
            InventoryError::ProductNotFound { .. }
        ));
        assert!(matches!(
            ledger.check_available(missing, 1).await.unwrap_err(),
            InventoryError::ProductNotFound { .. }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reservations_never_oversell() {
        let ledger = Arc::new(MemoryInventoryLedger::new());
        let product_id = Uuid::new_v4();
        ledger.set_stock(product_id, 10);

        // Two racing reservations of 6 against a stock of 10: exactly one
        // can be granted.
        let a = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.reserve(product_id, 6).await }
        });
        let b = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.reserve(product_id, 6).await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let granted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(granted, 1);
        assert_eq!(ledger.stock_level(product_id).await.unwrap(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn granted_total_never_exceeds_initial_stock() {
        let ledger = Arc::new(MemoryInventoryLedger::new());
        let product_id = Uuid::new_v4();
        ledger.set_stock(product_id, 100);

        let mut handles = Vec::new();
        for _ in 0..50 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move { ledger.reserve(product_id, 3).await }));
        }

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                granted += 1;
            }
        }

        // 50 * 3 = 150 requested against 100: 33 grants fit, stock ends at 1.
        assert_eq!(granted, 33);
        assert_eq!(ledger.stock_level(product_id).await.unwrap(), 1);
    }
}
