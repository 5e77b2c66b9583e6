use serde::{Deserialize, Serialize};

use forgestore_core::{DomainError, DomainResult, ProductId, UserId};

/// One desired (product, quantity) pair. Quantity is always positive; a
/// zero-quantity update removes the line instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Per-user mutable working set of cart lines, one line per product.
///
/// Created lazily on first add; mutated by the owning user only. Line order
/// carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    user_id: UserId,
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            lines: Vec::new(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line quantities (0 for an empty cart).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Current quantity for a product, 0 when the line is absent.
    pub fn line_quantity(&self, product_id: ProductId) -> i64 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Insert the line or add to its existing quantity. Returns the
    /// resulting line quantity.
    pub fn add_or_increment(&mut self, product_id: ProductId, quantity: i64) -> DomainResult<i64> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be greater than 0"));
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| DomainError::validation("quantity overflow"))?;
            Ok(line.quantity)
        } else {
            self.lines.push(CartLine {
                product_id,
                quantity,
            });
            Ok(quantity)
        }
    }

    /// Set a line's quantity outright. Zero removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if quantity == 0 {
            self.remove(product_id);
            return Ok(());
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        } else {
            self.lines.push(CartLine {
                product_id,
                quantity,
            });
        }
        Ok(())
    }

    /// Remove a product's line. Missing lines are not an error.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drop every line whose product fails the predicate, returning the
    /// dropped product ids. Used to normalize the cart on read when products
    /// have been deactivated or deleted since they were added.
    pub fn retain_products(
        &mut self,
        mut keep: impl FnMut(ProductId) -> bool,
    ) -> Vec<ProductId> {
        let mut dropped = Vec::new();
        self.lines.retain(|l| {
            if keep(l.product_id) {
                true
            } else {
                dropped.push(l.product_id);
                false
            }
        });
        dropped
    }

    /// Remove the lines consumed by a successful order composition.
    pub fn consume(&mut self, products: &[ProductId]) {
        self.lines.retain(|l| !products.contains(&l.product_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cart() -> Cart {
        Cart::empty(UserId::new())
    }

    #[test]
    fn add_inserts_then_increments() {
        let mut cart = test_cart();
        let product = ProductId::new();

        assert_eq!(cart.add_or_increment(product, 2).unwrap(), 2);
        assert_eq!(cart.add_or_increment(product, 3).unwrap(), 5);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn add_rejects_non_positive_quantity() {
        let mut cart = test_cart();
        let product = ProductId::new();

        assert!(cart.add_or_increment(product, 0).is_err());
        assert!(cart.add_or_increment(product, -2).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_zero_removes_the_line() {
        let mut cart = test_cart();
        let product = ProductId::new();

        cart.add_or_increment(product, 4).unwrap();
        cart.set_quantity(product, 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.line_quantity(product), 0);
    }

    #[test]
    fn set_quantity_overwrites_rather_than_adds() {
        let mut cart = test_cart();
        let product = ProductId::new();

        cart.add_or_increment(product, 4).unwrap();
        cart.set_quantity(product, 2).unwrap();
        assert_eq!(cart.line_quantity(product), 2);
    }

    #[test]
    fn remove_and_clear_are_unconditional() {
        let mut cart = test_cart();
        let product = ProductId::new();

        // Removing a line that was never added is fine.
        cart.remove(product);

        cart.add_or_increment(product, 1).unwrap();
        cart.add_or_increment(ProductId::new(), 2).unwrap();
        cart.clear();
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn retain_products_reports_dropped_lines() {
        let mut cart = test_cart();
        let keep_me = ProductId::new();
        let drop_me = ProductId::new();

        cart.add_or_increment(keep_me, 1).unwrap();
        cart.add_or_increment(drop_me, 2).unwrap();

        let dropped = cart.retain_products(|p| p == keep_me);
        assert_eq!(dropped, vec![drop_me]);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line_quantity(keep_me), 1);
    }

    #[test]
    fn consume_removes_only_the_composed_lines() {
        let mut cart = test_cart();
        let ordered = ProductId::new();
        let left_behind = ProductId::new();

        cart.add_or_increment(ordered, 2).unwrap();
        cart.add_or_increment(left_behind, 1).unwrap();

        cart.consume(&[ordered]);
        assert_eq!(cart.line_quantity(ordered), 0);
        assert_eq!(cart.line_quantity(left_behind), 1);
    }
}
