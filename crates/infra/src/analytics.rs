use std::sync::Arc;

use serde::Serialize;

use forgestore_core::DomainResult;
use forgestore_ledger::StockItem;

use crate::stores::LedgerStore;

/// Aggregate numbers derived from the ledger at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub total_items: u64,
    pub total_value_cents: u64,
    pub low_stock_count: u64,
    pub out_of_stock_count: u64,
}

/// Read-only view over the ledger: total inventory value, the low-stock set
/// and the out-of-stock set.
///
/// Holds no state of its own — every call recomputes from the ledger, so the
/// view can never drift from the quantities it reports. The sets are defined
/// purely by quantity and threshold; the active flag does not exclude an
/// item from them.
#[derive(Debug)]
pub struct InventoryAnalytics {
    ledger: Arc<LedgerStore>,
}

impl InventoryAnalytics {
    pub fn new(ledger: Arc<LedgerStore>) -> Self {
        Self { ledger }
    }

    pub fn summary(&self) -> DomainResult<InventorySummary> {
        let items = self.ledger.snapshot_items()?;

        let total_value_cents = items
            .iter()
            .map(|i| i.quantity_on_hand() as u64 * i.unit_price_cents())
            .sum();

        Ok(InventorySummary {
            total_items: items.len() as u64,
            total_value_cents,
            low_stock_count: items.iter().filter(|i| is_low_stock(i)).count() as u64,
            out_of_stock_count: items
                .iter()
                .filter(|i| i.quantity_on_hand() == 0)
                .count() as u64,
        })
    }

    /// Items with `0 < quantity <= threshold`.
    pub fn low_stock(&self) -> DomainResult<Vec<StockItem>> {
        let mut items: Vec<StockItem> = self
            .ledger
            .snapshot_items()?
            .into_iter()
            .filter(is_low_stock)
            .collect();
        items.sort_by_key(|i| i.quantity_on_hand());
        Ok(items)
    }

    /// Items with `quantity == 0`.
    pub fn out_of_stock(&self) -> DomainResult<Vec<StockItem>> {
        let mut items: Vec<StockItem> = self
            .ledger
            .snapshot_items()?
            .into_iter()
            .filter(|i| i.quantity_on_hand() == 0)
            .collect();
        items.sort_by(|a, b| a.sku().cmp(b.sku()));
        Ok(items)
    }
}

fn is_low_stock(item: &StockItem) -> bool {
    item.quantity_on_hand() > 0 && item.quantity_on_hand() <= item.low_stock_threshold()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forgestore_core::ProductId;

    fn seed(ledger: &LedgerStore, price: u64, quantity: i64, threshold: i64) -> ProductId {
        let id = ProductId::new();
        ledger
            .insert(
                StockItem::new(
                    id,
                    format!("SKU-{id}"),
                    "Gear".to_string(),
                    price,
                    quantity,
                    threshold,
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap();
        id
    }

    #[test]
    fn summary_reflects_the_ledger_at_call_time() {
        let ledger = Arc::new(LedgerStore::new());
        let analytics = InventoryAnalytics::new(ledger.clone());

        let healthy = seed(&ledger, 1000, 20, 5);
        seed(&ledger, 500, 3, 5); // low stock
        seed(&ledger, 2000, 0, 5); // out of stock

        let summary = analytics.summary().unwrap();
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_value_cents, 20 * 1000 + 3 * 500);
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.out_of_stock_count, 1);

        // No caching: a ledger write is visible on the next read.
        ledger.reserve_and_decrement(healthy, 17).unwrap();
        let summary = analytics.summary().unwrap();
        assert_eq!(summary.low_stock_count, 2);
        assert_eq!(summary.total_value_cents, 3 * 1000 + 3 * 500);
    }

    #[test]
    fn out_of_stock_requires_exactly_zero() {
        let ledger = Arc::new(LedgerStore::new());
        let analytics = InventoryAnalytics::new(ledger.clone());
        seed(&ledger, 1000, 1, 5);

        assert!(analytics.out_of_stock().unwrap().is_empty());
        assert_eq!(analytics.low_stock().unwrap().len(), 1);
    }
}
