//! Cart domain module.
//!
//! A cart is a per-user working set of desired (product, quantity) pairs.
//! It is advisory only: it never reserves stock, and everything in it is
//! re-validated authoritatively when an order is composed.

pub mod cart;

pub use cart::{Cart, CartLine};
