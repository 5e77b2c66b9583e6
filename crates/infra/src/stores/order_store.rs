use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use forgestore_core::{DomainError, DomainResult, OrderId, Page, PageParams, UserId};
use forgestore_orders::Order;

/// Committed orders, keyed by id.
///
/// Orders are inserted once by the composer and afterwards mutated only
/// through [`Self::update`], which the lifecycle driver uses so a transition
/// and its ledger effect commit inside one critical section. Orders are
/// never removed.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, HashMap<OrderId, Order>>> {
        self.orders
            .read()
            .map_err(|_| DomainError::internal("order lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, HashMap<OrderId, Order>>> {
        self.orders
            .write()
            .map_err(|_| DomainError::internal("order lock poisoned"))
    }

    pub fn insert(&self, order: Order) -> DomainResult<()> {
        let mut orders = self.write()?;
        if orders.contains_key(&order.id()) {
            return Err(DomainError::conflict("order already exists"));
        }
        orders.insert(order.id(), order);
        Ok(())
    }

    pub fn get(&self, order_id: OrderId) -> DomainResult<Order> {
        self.read()?
            .get(&order_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("order"))
    }

    /// Fetch an order the caller owns; foreign orders read as not found so
    /// ids don't leak across users.
    pub fn get_owned(&self, order_id: OrderId, user_id: UserId) -> DomainResult<Order> {
        let order = self.get(order_id)?;
        if order.user_id() != user_id {
            return Err(DomainError::not_found("order"));
        }
        Ok(order)
    }

    /// Newest-first page of one user's orders.
    pub fn list_for_user(&self, user_id: UserId, params: PageParams) -> DomainResult<Page<Order>> {
        let mut all: Vec<Order> = self
            .read()?
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(Page::slice(all, params))
    }

    /// Newest-first page across all users (privileged listings).
    pub fn list_all(&self, params: PageParams) -> DomainResult<Page<Order>> {
        let mut all: Vec<Order> = self.read()?.values().cloned().collect();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(Page::slice(all, params))
    }

    /// Run `f` against the order under the store's write lock. Everything
    /// `f` does — validation, ledger restore, history append — commits or
    /// fails as one unit as far as other threads can observe.
    pub(crate) fn update<T>(
        &self,
        order_id: OrderId,
        f: impl FnOnce(&mut Order) -> DomainResult<T>,
    ) -> DomainResult<T> {
        let mut orders = self.write()?;
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| DomainError::not_found("order"))?;
        f(order)
    }
}
