//! Order lifecycle state machine.
//!
//! The transition table is the single authority on which status moves are
//! legal and which of them touch the stock ledger. Anything not listed fails
//! with `InvalidTransition`; callers never check status strings ad hoc.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use forgestore_core::{DomainError, DomainResult};

/// Fulfillment status of an order.
///
/// `Pending` is initial. `Delivered`, `Canceled`, `Refunded` and `Returned`
/// are terminal except for the explicit reversals in the table
/// (delivered -> returned, delivered/canceled -> refunded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Canceled,
    Refunded,
    Returned,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
        OrderStatus::Refunded,
        OrderStatus::Returned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Returned => "returned",
        }
    }

    /// True when no transition leaves this status except the table's
    /// explicit reversals.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered
                | OrderStatus::Canceled
                | OrderStatus::Refunded
                | OrderStatus::Returned
        )
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "canceled" => Ok(OrderStatus::Canceled),
            "refunded" => Ok(OrderStatus::Refunded),
            "returned" => Ok(OrderStatus::Returned),
            other => Err(DomainError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

/// Payment-side status, tracked separately from fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl core::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(DomainError::validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

/// Ledger side effect a transition carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEffect {
    /// No ledger mutation.
    None,
    /// Restore every order line's quantity (compensating action).
    RestoreStock,
}

/// The transition table. Returns the ledger effect for an allowed
/// `from -> to` move, `InvalidTransition` for everything else.
///
/// | from | to | effect |
/// |---|---|---|
/// | pending | confirmed | none |
/// | confirmed | processing | none |
/// | processing | shipped | none |
/// | shipped | delivered | none |
/// | pending/confirmed/processing | canceled | restore stock |
/// | shipped/delivered | returned | restore stock |
/// | delivered/canceled | refunded | none (payment-side only) |
pub fn transition_effect(from: OrderStatus, to: OrderStatus) -> DomainResult<LedgerEffect> {
    use OrderStatus::*;

    match (from, to) {
        (Pending, Confirmed)
        | (Confirmed, Processing)
        | (Processing, Shipped)
        | (Shipped, Delivered)
        | (Delivered, Refunded)
        | (Canceled, Refunded) => Ok(LedgerEffect::None),

        (Pending, Canceled)
        | (Confirmed, Canceled)
        | (Processing, Canceled)
        | (Shipped, Returned)
        | (Delivered, Returned) => Ok(LedgerEffect::RestoreStock),

        (from, to) => Err(DomainError::invalid_transition(
            from.as_str(),
            to.as_str(),
        )),
    }
}

/// Payment status moves allowed outside the refund path: a pending payment
/// settles or fails, and a failed payment may be retried. `Refunded` is only
/// reachable through the order-level `refunded` transition.
pub fn payment_transition(from: PaymentStatus, to: PaymentStatus) -> DomainResult<()> {
    use PaymentStatus::*;

    match (from, to) {
        (Pending, Paid) | (Pending, Failed) | (Failed, Paid) => Ok(()),
        (from, to) => Err(DomainError::invalid_transition(
            from.as_str(),
            to.as_str(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_full_transition_table_and_nothing_else() {
        use OrderStatus::*;

        let allowed = [
            (Pending, Confirmed, LedgerEffect::None),
            (Confirmed, Processing, LedgerEffect::None),
            (Processing, Shipped, LedgerEffect::None),
            (Shipped, Delivered, LedgerEffect::None),
            (Pending, Canceled, LedgerEffect::RestoreStock),
            (Confirmed, Canceled, LedgerEffect::RestoreStock),
            (Processing, Canceled, LedgerEffect::RestoreStock),
            (Shipped, Returned, LedgerEffect::RestoreStock),
            (Delivered, Returned, LedgerEffect::RestoreStock),
            (Delivered, Refunded, LedgerEffect::None),
            (Canceled, Refunded, LedgerEffect::None),
        ];

        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = allowed
                    .iter()
                    .find(|(f, t, _)| *f == from && *t == to)
                    .map(|(_, _, e)| *e);

                match (transition_effect(from, to), expected) {
                    (Ok(effect), Some(e)) => assert_eq!(effect, e, "{from} -> {to}"),
                    (Err(DomainError::InvalidTransition { .. }), None) => {}
                    (got, want) => panic!("{from} -> {to}: got {got:?}, want {want:?}"),
                }
            }
        }
    }

    #[test]
    fn delivered_cannot_move_backwards() {
        let err = transition_effect(OrderStatus::Delivered, OrderStatus::Processing).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    #[test]
    fn canceled_cannot_be_confirmed() {
        let err = transition_effect(OrderStatus::Canceled, OrderStatus::Confirmed).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    #[test]
    fn terminal_statuses_are_exactly_the_four() {
        use OrderStatus::*;

        for status in OrderStatus::ALL {
            let expected = matches!(status, Delivered | Canceled | Refunded | Returned);
            assert_eq!(status.is_terminal(), expected, "{status}");
        }
    }

    #[test]
    fn statuses_roundtrip_through_strings() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("picked".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn payment_settlement_rules() {
        use PaymentStatus::*;

        assert!(payment_transition(Pending, Paid).is_ok());
        assert!(payment_transition(Pending, Failed).is_ok());
        assert!(payment_transition(Failed, Paid).is_ok());
        assert!(payment_transition(Paid, Pending).is_err());
        assert!(payment_transition(Pending, Refunded).is_err());
    }
}
