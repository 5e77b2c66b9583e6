//! In-memory stores guarded by `std::sync::RwLock`.
//!
//! Intended for tests/dev and single-process deployments; the store APIs are
//! shaped so a transactional backend can replace them without touching the
//! domain crates.

pub mod cart_store;
pub mod ledger_store;
pub mod order_store;

pub use cart_store::CartStore;
pub use ledger_store::LedgerStore;
pub use order_store::OrderStore;
