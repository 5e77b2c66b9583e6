use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgestore_core::{short_code, DomainError, DomainResult, ProductId};

/// Derived availability status of a stock item.
///
/// Never stored: always recomputed from `quantity_on_hand`, the threshold,
/// and the active flag, so it cannot drift from the quantity it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Active,
    LowStock,
    OutOfStock,
    Inactive,
}

/// Immutable copy of the catalog fields captured into an order line.
///
/// Snapshots decouple historical orders from later catalog edits: once taken,
/// a snapshot is never refreshed from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub sku: String,
    pub unit_price_cents: u64,
}

/// One sellable product in the stock ledger.
///
/// `quantity_on_hand` is the single source of truth for availability and is
/// never negative. Mutation goes through `try_decrement`/`restore` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    id: ProductId,
    sku: String,
    name: String,
    unit_price_cents: u64,
    quantity_on_hand: i64,
    low_stock_threshold: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl StockItem {
    pub fn new(
        id: ProductId,
        sku: String,
        name: String,
        unit_price_cents: u64,
        quantity_on_hand: i64,
        low_stock_threshold: i64,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if unit_price_cents == 0 {
            return Err(DomainError::validation("unit_price_cents must be positive"));
        }
        if quantity_on_hand < 0 {
            return Err(DomainError::validation("quantity_on_hand cannot be negative"));
        }
        if low_stock_threshold < 0 {
            return Err(DomainError::validation("low_stock_threshold cannot be negative"));
        }

        Ok(Self {
            id,
            sku,
            name,
            unit_price_cents,
            quantity_on_hand,
            low_stock_threshold,
            is_active: true,
            created_at,
        })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price_cents(&self) -> u64 {
        self.unit_price_cents
    }

    pub fn quantity_on_hand(&self) -> i64 {
        self.quantity_on_hand
    }

    pub fn low_stock_threshold(&self) -> i64 {
        self.low_stock_threshold
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Derived status; see [`StockStatus`].
    pub fn status(&self) -> StockStatus {
        if !self.is_active {
            StockStatus::Inactive
        } else if self.quantity_on_hand == 0 {
            StockStatus::OutOfStock
        } else if self.quantity_on_hand <= self.low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::Active
        }
    }

    /// Conditional decrement: succeeds only when the full quantity is on hand.
    ///
    /// The check and the mutation are one step on this value; the store wraps
    /// the call in a single critical section so no reader can observe a stale
    /// quantity in between. Fails without mutating.
    pub fn try_decrement(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if self.quantity_on_hand < quantity {
            return Err(DomainError::insufficient_stock(
                self.id,
                quantity,
                self.quantity_on_hand,
            ));
        }

        self.quantity_on_hand -= quantity;
        Ok(())
    }

    /// Unconditional increment, used as the compensating half of
    /// [`Self::try_decrement`] (order rollback, cancellation, returns) and
    /// for admin restock.
    pub fn restore(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        self.quantity_on_hand = self
            .quantity_on_hand
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invariant("quantity_on_hand overflow"))?;
        Ok(())
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn set_low_stock_threshold(&mut self, threshold: i64) -> DomainResult<()> {
        if threshold < 0 {
            return Err(DomainError::validation("low_stock_threshold cannot be negative"));
        }
        self.low_stock_threshold = threshold;
        Ok(())
    }

    /// Capture the catalog fields at this instant.
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            product_id: self.id,
            name: self.name.clone(),
            sku: self.sku.clone(),
            unit_price_cents: self.unit_price_cents,
        }
    }
}

/// Generate a `SKU-{millis}-{6 base36 chars}` code for items registered
/// without one.
pub fn generate_sku(at: DateTime<Utc>, entropy: Uuid) -> String {
    format!("SKU-{}-{}", at.timestamp_millis(), short_code(entropy, 6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_item(quantity: i64, threshold: i64) -> StockItem {
        StockItem::new(
            ProductId::new(),
            "SKU-TEST-1".to_string(),
            "Resistance Band".to_string(),
            1999,
            quantity,
            threshold,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn new_item_rejects_bad_input() {
        let id = ProductId::new();
        let now = Utc::now();
        assert!(StockItem::new(id, "S".into(), "  ".into(), 100, 1, 1, now).is_err());
        assert!(StockItem::new(id, " ".into(), "x".into(), 100, 1, 1, now).is_err());
        assert!(StockItem::new(id, "S".into(), "x".into(), 0, 1, 1, now).is_err());
        assert!(StockItem::new(id, "S".into(), "x".into(), 100, -1, 1, now).is_err());
        assert!(StockItem::new(id, "S".into(), "x".into(), 100, 1, -1, now).is_err());
    }

    #[test]
    fn decrement_succeeds_when_quantity_on_hand() {
        let mut item = test_item(5, 2);
        item.try_decrement(3).unwrap();
        assert_eq!(item.quantity_on_hand(), 2);
    }

    #[test]
    fn decrement_fails_without_mutating_when_short() {
        let mut item = test_item(2, 2);
        let err = item.try_decrement(3).unwrap_err();
        match err {
            DomainError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(item.quantity_on_hand(), 2);
    }

    #[test]
    fn non_positive_quantities_are_rejected() {
        let mut item = test_item(5, 2);
        assert!(item.try_decrement(0).is_err());
        assert!(item.try_decrement(-1).is_err());
        assert!(item.restore(0).is_err());
        assert_eq!(item.quantity_on_hand(), 5);
    }

    #[test]
    fn status_is_derived_from_quantity_threshold_and_active_flag() {
        let mut item = test_item(20, 10);
        assert_eq!(item.status(), StockStatus::Active);

        item.try_decrement(15).unwrap();
        assert_eq!(item.status(), StockStatus::LowStock);

        item.try_decrement(5).unwrap();
        assert_eq!(item.status(), StockStatus::OutOfStock);

        item.restore(1).unwrap();
        item.set_active(false);
        assert_eq!(item.status(), StockStatus::Inactive);
    }

    #[test]
    fn snapshot_is_decoupled_from_later_edits() {
        let mut item = test_item(5, 2);
        let snapshot = item.snapshot();

        item.set_active(false);
        item.try_decrement(5).unwrap();

        assert_eq!(snapshot.name, "Resistance Band");
        assert_eq!(snapshot.unit_price_cents, 1999);
    }

    #[test]
    fn generated_skus_have_expected_shape() {
        let sku = generate_sku(Utc::now(), Uuid::now_v7());
        assert!(sku.starts_with("SKU-"));
        assert_eq!(sku.split('-').count(), 3);
        assert_eq!(sku.split('-').next_back().unwrap().len(), 6);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any sequence of decrement/restore attempts,
        /// `quantity_on_hand` never goes negative.
        #[test]
        fn quantity_never_goes_negative(
            start in 0i64..1_000,
            ops in prop::collection::vec((any::<bool>(), 1i64..100), 0..50)
        ) {
            let mut item = test_item(start, 10);

            for (is_decrement, qty) in ops {
                if is_decrement {
                    let _ = item.try_decrement(qty);
                } else {
                    let _ = item.restore(qty);
                }
                prop_assert!(item.quantity_on_hand() >= 0);
            }
        }

        /// Property: a decrement followed by a restore of the same quantity
        /// leaves the quantity unchanged (the conservation law's single-item
        /// building block).
        #[test]
        fn decrement_then_restore_conserves_quantity(
            start in 0i64..1_000,
            qty in 1i64..100
        ) {
            let mut item = test_item(start, 10);
            if item.try_decrement(qty).is_ok() {
                item.restore(qty).unwrap();
            }
            prop_assert_eq!(item.quantity_on_hand(), start);
        }
    }
}
