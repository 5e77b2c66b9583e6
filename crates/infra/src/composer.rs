use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use forgestore_core::{AddressId, DomainError, DomainResult, OrderId, ProductId, UserId};
use forgestore_ledger::CatalogSnapshot;
use forgestore_orders::{Order, OrderLine, OrderNumber, PaymentMethod, Pricing};

use crate::directory::AddressDirectory;
use crate::stores::{CartStore, LedgerStore, OrderStore};

/// Pricing inputs the composer does not own: shipping is flat-rate
/// configuration, tax is a rate applied to the subtotal. Discounts arrive
/// per order from the caller.
#[derive(Debug, Clone, Copy)]
pub struct ComposerConfig {
    pub shipping_cost_cents: u64,
    /// Tax rate in basis points (e.g. 825 = 8.25%).
    pub tax_rate_bps: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            shipping_cost_cents: 1099,
            tax_rate_bps: 0,
        }
    }
}

/// Turns validated (product, quantity) lines into a committed order while
/// decrementing the ledger, all-or-nothing.
///
/// Decrements run one product at a time in ascending `ProductId` order (a
/// stable operation order, so two compositions over overlapping product sets
/// cannot deadlock or interleave inconsistently), and every completed
/// decrement is compensated with a restore the moment any later step fails.
/// A failed composition is therefore never observable: no order record, no
/// net ledger change. The whole sequence is synchronous (no await points),
/// so a client disconnecting mid-request cannot abandon it half-done.
#[derive(Debug)]
pub struct OrderComposer {
    ledger: Arc<LedgerStore>,
    carts: Arc<CartStore>,
    orders: Arc<OrderStore>,
    directory: Arc<AddressDirectory>,
    config: ComposerConfig,
}

impl OrderComposer {
    pub fn new(
        ledger: Arc<LedgerStore>,
        carts: Arc<CartStore>,
        orders: Arc<OrderStore>,
        directory: Arc<AddressDirectory>,
        config: ComposerConfig,
    ) -> Self {
        Self {
            ledger,
            carts,
            orders,
            directory,
            config,
        }
    }

    pub fn config(&self) -> ComposerConfig {
        self.config
    }

    pub fn compose(
        &self,
        user_id: UserId,
        lines: &[(ProductId, i64)],
        address_id: AddressId,
        payment_method: PaymentMethod,
        discount_cents: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<Order> {
        if lines.is_empty() {
            return Err(DomainError::validation("order must contain at least one line"));
        }
        for (_, quantity) in lines {
            if *quantity <= 0 {
                return Err(DomainError::validation("quantity must be greater than 0"));
            }
        }

        let mut sorted: Vec<(ProductId, i64)> = lines.to_vec();
        sorted.sort_by_key(|(product_id, _)| *product_id);
        if sorted.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(DomainError::validation("duplicate product in order lines"));
        }

        self.directory.require(user_id, address_id)?;

        // Authoritative reservation pass. From here on, any failure must
        // compensate every decrement already made before surfacing.
        let mut reserved: Vec<(CatalogSnapshot, i64)> = Vec::with_capacity(sorted.len());
        for (product_id, quantity) in &sorted {
            match self.ledger.reserve_and_decrement(*product_id, *quantity) {
                Ok(snapshot) => reserved.push((snapshot, *quantity)),
                Err(err) => {
                    self.rollback(&reserved);
                    return Err(err);
                }
            }
        }

        match self.persist(user_id, &reserved, address_id, payment_method, discount_cents, now) {
            Ok(order) => {
                // The order is committed; a cart hiccup must not fail it.
                let products: Vec<ProductId> = sorted.iter().map(|(p, _)| *p).collect();
                if let Err(err) = self.carts.consume_lines(user_id, &products) {
                    tracing::warn!(user_id = %user_id, %err, "failed to consume composed cart lines");
                }
                tracing::info!(
                    order_number = %order.order_number(),
                    user_id = %user_id,
                    total_cents = order.pricing().total_cents,
                    lines = order.lines().len(),
                    "order composed"
                );
                Ok(order)
            }
            Err(err) => {
                self.rollback(&reserved);
                Err(err)
            }
        }
    }

    fn persist(
        &self,
        user_id: UserId,
        reserved: &[(CatalogSnapshot, i64)],
        address_id: AddressId,
        payment_method: PaymentMethod,
        discount_cents: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<Order> {
        let mut order_lines = Vec::with_capacity(reserved.len());
        let mut subtotal_cents: u64 = 0;
        for (snapshot, quantity) in reserved {
            let line = OrderLine::from_snapshot(snapshot.clone(), *quantity)?;
            subtotal_cents = subtotal_cents
                .checked_add(line.line_total_cents)
                .ok_or_else(|| DomainError::validation("price overflow"))?;
            order_lines.push(line);
        }

        let tax_cents =
            (subtotal_cents as u128 * self.config.tax_rate_bps as u128 / 10_000) as u64;
        let pricing = Pricing::compute(
            subtotal_cents,
            self.config.shipping_cost_cents,
            tax_cents,
            discount_cents,
        )?;

        let order_id = OrderId::new();
        let order = Order::create(
            order_id,
            OrderNumber::generate(now, Uuid::now_v7()),
            user_id,
            order_lines,
            address_id,
            payment_method,
            pricing,
            now,
        )?;

        self.orders.insert(order.clone())?;
        Ok(order)
    }

    fn rollback(&self, reserved: &[(CatalogSnapshot, i64)]) {
        for (snapshot, quantity) in reserved {
            if let Err(err) = self.ledger.restore(snapshot.product_id, *quantity) {
                // Products are never deleted from the ledger, so this path
                // should be unreachable; if it ever fires the discrepancy
                // must be visible in the logs.
                tracing::error!(
                    product_id = %snapshot.product_id,
                    quantity,
                    %err,
                    "failed to roll back stock decrement"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forgestore_ledger::StockItem;

    struct Fixture {
        ledger: Arc<LedgerStore>,
        carts: Arc<CartStore>,
        orders: Arc<OrderStore>,
        directory: Arc<AddressDirectory>,
        composer: OrderComposer,
        user: UserId,
        address: AddressId,
    }

    fn fixture() -> Fixture {
        let ledger = Arc::new(LedgerStore::new());
        let carts = Arc::new(CartStore::new(ledger.clone()));
        let orders = Arc::new(OrderStore::new());
        let directory = Arc::new(AddressDirectory::new());
        let composer = OrderComposer::new(
            ledger.clone(),
            carts.clone(),
            orders.clone(),
            directory.clone(),
            ComposerConfig::default(),
        );

        let user = UserId::new();
        let address = AddressId::new();
        directory.register(user, address).unwrap();

        Fixture {
            ledger,
            carts,
            orders,
            directory,
            composer,
            user,
            address,
        }
    }

    fn seed(fx: &Fixture, name: &str, price: u64, quantity: i64) -> ProductId {
        let id = ProductId::new();
        fx.ledger
            .insert(
                StockItem::new(
                    id,
                    format!("SKU-{id}"),
                    name.to_string(),
                    price,
                    quantity,
                    5,
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap();
        id
    }

    #[test]
    fn compose_decrements_snapshots_and_prices() {
        let fx = fixture();
        let product = seed(&fx, "Dumbbell Set", 4999, 8);

        let order = fx
            .composer
            .compose(
                fx.user,
                &[(product, 3)],
                fx.address,
                PaymentMethod::Card,
                0,
                Utc::now(),
            )
            .unwrap();

        assert_eq!(fx.ledger.get(product).unwrap().quantity_on_hand(), 5);
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.lines()[0].product_name, "Dumbbell Set");
        assert_eq!(order.pricing().subtotal_cents, 14_997);
        assert_eq!(order.pricing().total_cents, 14_997 + 1099);
        assert_eq!(fx.orders.get(order.id()).unwrap(), order);
    }

    #[test]
    fn compose_rejects_empty_and_non_positive_lines() {
        let fx = fixture();
        let product = seed(&fx, "Bench", 9999, 2);

        let empty = fx.composer.compose(
            fx.user,
            &[],
            fx.address,
            PaymentMethod::Card,
            0,
            Utc::now(),
        );
        assert!(matches!(empty, Err(DomainError::Validation(_))));

        let zero = fx.composer.compose(
            fx.user,
            &[(product, 0)],
            fx.address,
            PaymentMethod::Card,
            0,
            Utc::now(),
        );
        assert!(matches!(zero, Err(DomainError::Validation(_))));
    }

    #[test]
    fn compose_rejects_duplicate_products() {
        let fx = fixture();
        let product = seed(&fx, "Bench", 9999, 5);

        let err = fx
            .composer
            .compose(
                fx.user,
                &[(product, 1), (product, 2)],
                fx.address,
                PaymentMethod::Card,
                0,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(fx.ledger.get(product).unwrap().quantity_on_hand(), 5);
    }

    #[test]
    fn compose_requires_a_known_address() {
        let fx = fixture();
        let product = seed(&fx, "Bench", 9999, 5);

        let err = fx
            .composer
            .compose(
                fx.user,
                &[(product, 1)],
                AddressId::new(),
                PaymentMethod::Card,
                0,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(fx.ledger.get(product).unwrap().quantity_on_hand(), 5);
    }

    #[test]
    fn partial_failure_rolls_back_every_decrement() {
        let fx = fixture();
        let plenty = seed(&fx, "Plenty", 1000, 10);
        let scarce = seed(&fx, "Scarce", 2000, 1);

        let err = fx
            .composer
            .compose(
                fx.user,
                &[(plenty, 3), (scarce, 2)],
                fx.address,
                PaymentMethod::Card,
                0,
                Utc::now(),
            )
            .unwrap_err();

        match err {
            DomainError::InsufficientStock {
                product_id,
                requested,
                available,
            } => {
                assert_eq!(product_id, scarce);
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(fx.ledger.get(plenty).unwrap().quantity_on_hand(), 10);
        assert_eq!(fx.ledger.get(scarce).unwrap().quantity_on_hand(), 1);
        assert_eq!(
            fx.orders.list_all(Default::default()).unwrap().total_items,
            0
        );
    }

    #[test]
    fn excessive_discount_fails_and_rolls_back() {
        let fx = fixture();
        let product = seed(&fx, "Towel", 500, 5);

        let err = fx
            .composer
            .compose(
                fx.user,
                &[(product, 1)],
                fx.address,
                PaymentMethod::Card,
                1_000_000,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(fx.ledger.get(product).unwrap().quantity_on_hand(), 5);
    }

    #[test]
    fn compose_consumes_matching_cart_lines() {
        let fx = fixture();
        let ordered = seed(&fx, "Ordered", 1000, 10);
        let kept = seed(&fx, "Kept", 1000, 10);

        fx.carts.add_or_increment(fx.user, ordered, 2).unwrap();
        fx.carts.add_or_increment(fx.user, kept, 1).unwrap();

        fx.composer
            .compose(
                fx.user,
                &[(ordered, 2)],
                fx.address,
                PaymentMethod::Wallet,
                0,
                Utc::now(),
            )
            .unwrap();

        let cart = fx.carts.get(fx.user).unwrap();
        assert_eq!(cart.line_quantity(ordered), 0);
        assert_eq!(cart.line_quantity(kept), 1);
    }

    #[test]
    fn tax_rate_applies_to_subtotal() {
        let fx = fixture();
        let ledger = fx.ledger.clone();
        let composer = OrderComposer::new(
            ledger.clone(),
            fx.carts.clone(),
            fx.orders.clone(),
            fx.directory.clone(),
            ComposerConfig {
                shipping_cost_cents: 0,
                tax_rate_bps: 825,
            },
        );
        let product = seed(&fx, "Taxed", 10_000, 5);

        let order = composer
            .compose(
                fx.user,
                &[(product, 1)],
                fx.address,
                PaymentMethod::Card,
                0,
                Utc::now(),
            )
            .unwrap();
        assert_eq!(order.pricing().tax_cents, 825);
        assert_eq!(order.pricing().total_cents, 10_825);
    }
}
