//! Order domain module.
//!
//! An order is the immutable record produced by composing a cart against the
//! stock ledger: line snapshots, pricing, and an append-only status history.
//! After creation only the lifecycle fields move, and only along the explicit
//! transition table in [`lifecycle`].

pub mod lifecycle;
pub mod order;

pub use lifecycle::{
    payment_transition, transition_effect, LedgerEffect, OrderStatus, PaymentStatus,
};
pub use order::{
    Order, OrderLine, OrderNumber, PaymentMethod, Pricing, StatusHistoryEntry,
};
