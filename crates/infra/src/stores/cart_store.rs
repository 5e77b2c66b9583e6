use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use forgestore_cart::Cart;
use forgestore_core::{DomainError, DomainResult, ProductId, UserId};

use super::ledger_store::LedgerStore;

/// Per-user cart storage plus the advisory stock checks.
///
/// Checks here run against the ledger's currently visible quantity and are
/// UX hints only — nothing is reserved, and everything is re-validated
/// authoritatively when the order composer commits. Carts are normalized on
/// every read: lines whose product has been deactivated or deleted are
/// dropped and the drop is persisted.
#[derive(Debug)]
pub struct CartStore {
    ledger: Arc<LedgerStore>,
    carts: RwLock<HashMap<UserId, Cart>>,
}

impl CartStore {
    pub fn new(ledger: Arc<LedgerStore>) -> Self {
        Self {
            ledger,
            carts: RwLock::new(HashMap::new()),
        }
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, HashMap<UserId, Cart>>> {
        self.carts
            .write()
            .map_err(|_| DomainError::internal("cart lock poisoned"))
    }

    /// Advisory availability check: product must be visible (registered and
    /// active) and the prospective line quantity must fit the currently
    /// visible on-hand count. Race-tolerant by design.
    fn check_advisory(&self, product_id: ProductId, prospective: i64) -> DomainResult<()> {
        let item = self.ledger.get(product_id)?;
        if !item.is_active() {
            return Err(DomainError::not_found("product"));
        }
        if prospective > item.quantity_on_hand() {
            return Err(DomainError::insufficient_stock(
                product_id,
                prospective,
                item.quantity_on_hand(),
            ));
        }
        Ok(())
    }

    /// Insert or sum the line; the cart is created lazily on first add.
    pub fn add_or_increment(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<Cart> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be greater than 0"));
        }

        let mut carts = self.write()?;
        let cart = carts
            .entry(user_id)
            .or_insert_with(|| Cart::empty(user_id));

        let prospective = cart
            .line_quantity(product_id)
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("quantity overflow"))?;
        self.check_advisory(product_id, prospective)?;

        cart.add_or_increment(product_id, quantity)?;
        Ok(cart.clone())
    }

    /// Overwrite a line's quantity; zero removes it without any stock check.
    pub fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<Cart> {
        if quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }

        let mut carts = self.write()?;
        let cart = carts
            .entry(user_id)
            .or_insert_with(|| Cart::empty(user_id));

        if quantity > 0 {
            self.check_advisory(product_id, quantity)?;
        }
        cart.set_quantity(product_id, quantity)?;
        Ok(cart.clone())
    }

    /// Unconditional line removal; a missing cart or line is not an error.
    pub fn remove(&self, user_id: UserId, product_id: ProductId) -> DomainResult<Cart> {
        let mut carts = self.write()?;
        let cart = carts
            .entry(user_id)
            .or_insert_with(|| Cart::empty(user_id));
        cart.remove(product_id);
        Ok(cart.clone())
    }

    pub fn clear(&self, user_id: UserId) -> DomainResult<()> {
        self.write()?.remove(&user_id);
        Ok(())
    }

    /// Normalized view of the cart (missing carts read as empty).
    pub fn get(&self, user_id: UserId) -> DomainResult<Cart> {
        let mut carts = self.write()?;
        match carts.get_mut(&user_id) {
            Some(cart) => {
                self.normalize(cart);
                Ok(cart.clone())
            }
            None => Ok(Cart::empty(user_id)),
        }
    }

    /// Sum of quantities across the normalized cart.
    pub fn item_count(&self, user_id: UserId) -> DomainResult<i64> {
        Ok(self.get(user_id)?.item_count())
    }

    /// Remove the lines consumed by a successful composition.
    pub fn consume_lines(&self, user_id: UserId, products: &[ProductId]) -> DomainResult<()> {
        let mut carts = self.write()?;
        if let Some(cart) = carts.get_mut(&user_id) {
            cart.consume(products);
        }
        Ok(())
    }

    fn normalize(&self, cart: &mut Cart) {
        let dropped = cart.retain_products(|product_id| {
            self.ledger
                .get(product_id)
                .map(|item| item.is_active())
                .unwrap_or(false)
        });
        if !dropped.is_empty() {
            tracing::debug!(
                user_id = %cart.user_id(),
                dropped = dropped.len(),
                "dropped unavailable products from cart"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forgestore_ledger::StockItem;

    fn setup() -> (Arc<LedgerStore>, CartStore, ProductId) {
        let ledger = Arc::new(LedgerStore::new());
        let id = ProductId::new();
        ledger
            .insert(
                StockItem::new(
                    id,
                    "SKU-MAT".to_string(),
                    "Yoga Mat".to_string(),
                    3499,
                    10,
                    3,
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap();
        let carts = CartStore::new(ledger.clone());
        (ledger, carts, id)
    }

    #[test]
    fn add_creates_cart_lazily_and_sums_lines() {
        let (_ledger, carts, product) = setup();
        let user = UserId::new();

        carts.add_or_increment(user, product, 2).unwrap();
        let cart = carts.add_or_increment(user, product, 3).unwrap();
        assert_eq!(cart.line_quantity(product), 5);
        assert_eq!(carts.item_count(user).unwrap(), 5);
    }

    #[test]
    fn advisory_check_counts_the_existing_line() {
        let (_ledger, carts, product) = setup();
        let user = UserId::new();

        carts.add_or_increment(user, product, 8).unwrap();
        let err = carts.add_or_increment(user, product, 3).unwrap_err();
        match err {
            DomainError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 11);
                assert_eq!(available, 10);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn unknown_or_inactive_products_are_not_found() {
        let (ledger, carts, product) = setup();
        let user = UserId::new();

        let missing = carts.add_or_increment(user, ProductId::new(), 1);
        assert!(matches!(missing, Err(DomainError::NotFound(_))));

        ledger.set_active(product, false).unwrap();
        let inactive = carts.add_or_increment(user, product, 1);
        assert!(matches!(inactive, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn set_quantity_zero_removes_without_stock_check() {
        let (ledger, carts, product) = setup();
        let user = UserId::new();

        carts.add_or_increment(user, product, 2).unwrap();
        // Even once the product is gone, zeroing the line must work.
        ledger.set_active(product, false).unwrap();
        let cart = carts.set_quantity(user, product, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn reads_drop_deactivated_products_and_persist_the_drop() {
        let (ledger, carts, product) = setup();
        let user = UserId::new();

        carts.add_or_increment(user, product, 2).unwrap();
        ledger.set_active(product, false).unwrap();

        let cart = carts.get(user).unwrap();
        assert!(cart.is_empty());

        // Reactivating does not resurrect the dropped line.
        ledger.set_active(product, true).unwrap();
        assert_eq!(carts.get(user).unwrap().item_count(), 0);
    }

    #[test]
    fn missing_cart_reads_as_empty() {
        let (_ledger, carts, _product) = setup();
        let user = UserId::new();

        assert!(carts.get(user).unwrap().is_empty());
        assert_eq!(carts.item_count(user).unwrap(), 0);
        carts.clear(user).unwrap();
    }
}
