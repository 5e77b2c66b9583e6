use std::sync::Arc;

use chrono::{DateTime, Utc};

use forgestore_core::{DomainError, DomainResult, OrderId, UserId};
use forgestore_orders::{LedgerEffect, Order, OrderStatus, PaymentStatus};

use crate::stores::{LedgerStore, OrderStore};

/// Drives committed orders through the lifecycle table and performs the
/// ledger side effects transitions carry.
///
/// Each transition runs under the order store's write lock: the validation,
/// the compensating `restore_all`, the `stock_restored` flag and the history
/// append all commit together. Replaying a transition an order has already
/// taken is a no-op — no duplicate history entry, no double restore.
#[derive(Debug)]
pub struct OrderLifecycle {
    orders: Arc<OrderStore>,
    ledger: Arc<LedgerStore>,
}

impl OrderLifecycle {
    pub fn new(orders: Arc<OrderStore>, ledger: Arc<LedgerStore>) -> Self {
        Self { orders, ledger }
    }

    /// Privileged transition to any status the table allows from the
    /// order's current state.
    pub fn transition(
        &self,
        order_id: OrderId,
        to: OrderStatus,
        actor: Option<UserId>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Order> {
        self.orders.update(order_id, |order| {
            self.transition_locked(order, to, actor, notes, now)
        })
    }

    /// Customer-facing cancellation: the caller must own the order. Allowed
    /// from pending, confirmed and processing per the table.
    pub fn cancel(
        &self,
        order_id: OrderId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Order> {
        self.orders.update(order_id, |order| {
            if order.user_id() != user_id {
                return Err(DomainError::not_found("order"));
            }
            self.transition_locked(order, OrderStatus::Canceled, Some(user_id), None, now)
        })
    }

    /// Payment settlement (paid/failed) reported by the payment collaborator.
    pub fn set_payment_status(
        &self,
        order_id: OrderId,
        to: PaymentStatus,
    ) -> DomainResult<Order> {
        self.orders.update(order_id, |order| {
            order.set_payment_status(to)?;
            Ok(order.clone())
        })
    }

    fn transition_locked(
        &self,
        order: &mut Order,
        to: OrderStatus,
        actor: Option<UserId>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Order> {
        if order.order_status() == to {
            // Idempotent replay (e.g. a cancellation retried after a crash).
            return Ok(order.clone());
        }

        let effect = order.next_effect(to)?;

        if effect == LedgerEffect::RestoreStock && !order.stock_restored() {
            self.ledger.restore_all(&order.restock_lines())?;
            order.mark_stock_restored();
        }

        order.apply_transition(to, actor, notes, now);
        tracing::info!(
            order_number = %order.order_number(),
            status = %to,
            restored_stock = matches!(effect, LedgerEffect::RestoreStock),
            "order transitioned"
        );
        Ok(order.clone())
    }
}
