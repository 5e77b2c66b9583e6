use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use forgestore_core::{DomainError, DomainResult, Page, PageParams, ProductId};
use forgestore_ledger::{CatalogSnapshot, StockItem, StockStatus};

/// Authoritative per-product stock store.
///
/// Every conditional decrement runs inside a single write-lock critical
/// section, so the availability check and the mutation are indivisible and
/// no reader can observe a quantity that is about to be rolled back.
#[derive(Debug, Default)]
pub struct LedgerStore {
    items: RwLock<HashMap<ProductId, StockItem>>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, HashMap<ProductId, StockItem>>> {
        self.items
            .read()
            .map_err(|_| DomainError::internal("ledger lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, HashMap<ProductId, StockItem>>> {
        self.items
            .write()
            .map_err(|_| DomainError::internal("ledger lock poisoned"))
    }

    /// Register a new product. The ledger owns the quantity from here on.
    pub fn insert(&self, item: StockItem) -> DomainResult<()> {
        let mut items = self.write()?;
        if items.contains_key(&item.id()) {
            return Err(DomainError::conflict("product already registered"));
        }
        items.insert(item.id(), item);
        Ok(())
    }

    pub fn get(&self, product_id: ProductId) -> DomainResult<StockItem> {
        self.read()?
            .get(&product_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("product"))
    }

    /// Derived status for one product; recomputed on every call.
    pub fn status_of(&self, product_id: ProductId) -> DomainResult<StockStatus> {
        Ok(self.get(product_id)?.status())
    }

    /// Atomically check-and-decrement a product's quantity, returning the
    /// catalog snapshot taken inside the same critical section (so order
    /// lines never re-read the catalog after the decrement).
    ///
    /// Inactive and unknown products both read as not found, matching what
    /// the storefront shows for them. Fails without mutating.
    pub fn reserve_and_decrement(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<CatalogSnapshot> {
        let mut items = self.write()?;
        let item = items
            .get_mut(&product_id)
            .filter(|i| i.is_active())
            .ok_or_else(|| DomainError::not_found("product"))?;

        item.try_decrement(quantity)?;
        Ok(item.snapshot())
    }

    /// Compensating increment for a single product.
    pub fn restore(&self, product_id: ProductId, quantity: i64) -> DomainResult<()> {
        let mut items = self.write()?;
        let item = items
            .get_mut(&product_id)
            .ok_or_else(|| DomainError::not_found("product"))?;
        item.restore(quantity)
    }

    /// Compensating increment for a whole order, in one critical section:
    /// verifies every product first, then applies every increment, so a
    /// partial restore is never observable. Inactive products still accept
    /// restores — deactivation must not strand stock owed by a cancellation.
    pub fn restore_all(&self, lines: &[(ProductId, i64)]) -> DomainResult<()> {
        let mut items = self.write()?;

        for (product_id, quantity) in lines {
            if *quantity <= 0 {
                return Err(DomainError::validation("quantity must be positive"));
            }
            if !items.contains_key(product_id) {
                return Err(DomainError::not_found("product"));
            }
        }

        for (product_id, quantity) in lines {
            if let Some(item) = items.get_mut(product_id) {
                item.restore(*quantity)?;
            }
        }
        Ok(())
    }

    /// Admin restock (receiving new inventory).
    pub fn restock(&self, product_id: ProductId, quantity: i64) -> DomainResult<StockItem> {
        let mut items = self.write()?;
        let item = items
            .get_mut(&product_id)
            .ok_or_else(|| DomainError::not_found("product"))?;
        item.restore(quantity)?;
        Ok(item.clone())
    }

    /// Activate/deactivate a product. Historical order snapshots are
    /// untouched by either.
    pub fn set_active(&self, product_id: ProductId, active: bool) -> DomainResult<StockItem> {
        let mut items = self.write()?;
        let item = items
            .get_mut(&product_id)
            .ok_or_else(|| DomainError::not_found("product"))?;
        item.set_active(active);
        Ok(item.clone())
    }

    pub fn set_low_stock_threshold(
        &self,
        product_id: ProductId,
        threshold: i64,
    ) -> DomainResult<StockItem> {
        let mut items = self.write()?;
        let item = items
            .get_mut(&product_id)
            .ok_or_else(|| DomainError::not_found("product"))?;
        item.set_low_stock_threshold(threshold)?;
        Ok(item.clone())
    }

    /// Newest-first page of all products.
    pub fn list(&self, params: PageParams) -> DomainResult<Page<StockItem>> {
        let mut all: Vec<StockItem> = self.read()?.values().cloned().collect();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(a.sku().cmp(b.sku())));
        Ok(Page::slice(all, params))
    }

    /// Point-in-time copy of every item, for the analytics view.
    pub fn snapshot_items(&self) -> DomainResult<Vec<StockItem>> {
        Ok(self.read()?.values().cloned().collect())
    }
}
