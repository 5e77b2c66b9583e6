//! Shared-state infrastructure: the stores behind the domain crates, the
//! order composer, the lifecycle driver, and the derived analytics view.
//!
//! The ledger store is the only resource shared across users; carts are
//! per-user and orders are immutable after composition except for lifecycle
//! fields. Lock ordering is fixed to keep multi-store operations deadlock
//! free: the order store lock may be taken first and the ledger lock inside
//! it (lifecycle), but never the reverse — the composer finishes all ledger
//! work before touching the order store.

pub mod analytics;
pub mod composer;
pub mod directory;
pub mod lifecycle;
pub mod stores;

pub use analytics::{InventoryAnalytics, InventorySummary};
pub use composer::{ComposerConfig, OrderComposer};
pub use directory::AddressDirectory;
pub use lifecycle::OrderLifecycle;
pub use stores::{CartStore, LedgerStore, OrderStore};
