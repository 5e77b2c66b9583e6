use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgestore_core::{short_code, AddressId, DomainError, DomainResult, OrderId, ProductId, UserId};
use forgestore_ledger::CatalogSnapshot;

use crate::lifecycle::{payment_transition, LedgerEffect, OrderStatus, PaymentStatus};

/// Globally unique, human-legible order reference: `ORD-{millis}-{base36}`.
/// Immutable for the order's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn generate(at: DateTime<Utc>, entropy: Uuid) -> Self {
        Self(format!(
            "ORD-{}-{}",
            at.timestamp_millis(),
            short_code(entropy, 9)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the customer pays. Supplied at composition; the payment gateway
/// itself is an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Paypal,
    BankTransfer,
    CashOnDelivery,
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::Wallet => "wallet",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "paypal" => Ok(PaymentMethod::Paypal),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "cash_on_delivery" => Ok(PaymentMethod::CashOnDelivery),
            "wallet" => Ok(PaymentMethod::Wallet),
            other => Err(DomainError::validation(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

/// Order line: an immutable snapshot of the catalog fields at composition
/// time plus the quantity sold. Never re-fetched from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub sku: String,
    pub unit_price_cents: u64,
    pub quantity: i64,
    pub line_total_cents: u64,
}

impl OrderLine {
    pub fn from_snapshot(snapshot: CatalogSnapshot, quantity: i64) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let line_total_cents = snapshot
            .unit_price_cents
            .checked_mul(quantity as u64)
            .ok_or_else(|| DomainError::validation("line total overflow"))?;

        Ok(Self {
            product_id: snapshot.product_id,
            product_name: snapshot.name,
            sku: snapshot.sku,
            unit_price_cents: snapshot.unit_price_cents,
            quantity,
            line_total_cents,
        })
    }
}

/// Monetary breakdown, all integer cents (exact 2-decimal amounts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub subtotal_cents: u64,
    pub shipping_cost_cents: u64,
    pub tax_cents: u64,
    pub discount_cents: u64,
    pub total_cents: u64,
}

impl Pricing {
    /// `total = subtotal + shipping + tax - discount`; a discount larger
    /// than the rest of the total is rejected rather than clamped.
    pub fn compute(
        subtotal_cents: u64,
        shipping_cost_cents: u64,
        tax_cents: u64,
        discount_cents: u64,
    ) -> DomainResult<Self> {
        let gross = subtotal_cents
            .checked_add(shipping_cost_cents)
            .and_then(|v| v.checked_add(tax_cents))
            .ok_or_else(|| DomainError::validation("price overflow"))?;

        let total_cents = gross.checked_sub(discount_cents).ok_or_else(|| {
            DomainError::validation("discount exceeds order total")
        })?;

        Ok(Self {
            subtotal_cents,
            shipping_cost_cents,
            tax_cents,
            discount_cents,
            total_cents,
        })
    }
}

/// One append-only audit record per successful status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub actor: Option<UserId>,
    pub notes: Option<String>,
}

/// A committed order.
///
/// Created once by the composer; afterwards only the lifecycle fields
/// (statuses, history, fulfillment stamps, the restore flag) ever change.
/// Orders are never deleted, only transitioned to terminal states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_number: OrderNumber,
    user_id: UserId,
    lines: Vec<OrderLine>,
    address_id: AddressId,
    payment_method: PaymentMethod,
    pricing: Pricing,
    order_status: OrderStatus,
    payment_status: PaymentStatus,
    status_history: Vec<StatusHistoryEntry>,
    stock_restored: bool,
    created_at: DateTime<Utc>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: OrderId,
        order_number: OrderNumber,
        user_id: UserId,
        lines: Vec<OrderLine>,
        address_id: AddressId,
        payment_method: PaymentMethod,
        pricing: Pricing,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("order must contain at least one line"));
        }

        Ok(Self {
            id,
            order_number,
            user_id,
            lines,
            address_id,
            payment_method,
            pricing,
            order_status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            status_history: vec![StatusHistoryEntry {
                status: OrderStatus::Pending,
                timestamp: created_at,
                actor: Some(user_id),
                notes: None,
            }],
            stock_restored: false,
            created_at,
            shipped_at: None,
            delivered_at: None,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn address_id(&self) -> AddressId {
        self.address_id
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    pub fn order_status(&self) -> OrderStatus {
        self.order_status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn status_history(&self) -> &[StatusHistoryEntry] {
        &self.status_history
    }

    pub fn stock_restored(&self) -> bool {
        self.stock_restored
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// The (product, quantity) pairs to hand back to the ledger when a
    /// stock-restoring transition fires.
    pub fn restock_lines(&self) -> Vec<(ProductId, i64)> {
        self.lines
            .iter()
            .map(|l| (l.product_id, l.quantity))
            .collect()
    }

    /// Decision half of a transition: validate `current -> to` against the
    /// table and report the ledger effect, without mutating. The lifecycle
    /// driver performs the effect and then calls [`Self::apply_transition`],
    /// so the ledger restore and the history append commit together.
    pub fn next_effect(&self, to: OrderStatus) -> DomainResult<LedgerEffect> {
        crate::lifecycle::transition_effect(self.order_status, to)
    }

    /// Mutation half of a transition. Callers must have validated via
    /// [`Self::next_effect`]; this never fails and appends exactly one
    /// history entry.
    pub fn apply_transition(
        &mut self,
        to: OrderStatus,
        actor: Option<UserId>,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.order_status = to;
        self.status_history.push(StatusHistoryEntry {
            status: to,
            timestamp: at,
            actor,
            notes,
        });

        match to {
            OrderStatus::Shipped => self.shipped_at = Some(at),
            OrderStatus::Delivered => self.delivered_at = Some(at),
            OrderStatus::Refunded => self.payment_status = PaymentStatus::Refunded,
            _ => {}
        }
    }

    /// Set once the compensating restore has run, inside the same critical
    /// section as the transition. A replayed cancellation sees the flag and
    /// must not restore again.
    pub fn mark_stock_restored(&mut self) {
        self.stock_restored = true;
    }

    /// Payment settlement outside the refund path (paid/failed).
    pub fn set_payment_status(&mut self, to: PaymentStatus) -> DomainResult<()> {
        if to == self.payment_status {
            return Ok(());
        }
        payment_transition(self.payment_status, to)?;
        self.payment_status = to;
        Ok(())
    }
}
