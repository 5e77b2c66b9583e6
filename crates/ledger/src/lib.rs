//! Stock ledger domain module.
//!
//! This crate contains the business rules for per-product stock: the
//! conditional decrement / compensating restore pair, the derived stock
//! status, and the catalog snapshot captured into order lines. Pure domain
//! logic only (no IO, no HTTP, no locking — the shared store lives in
//! `forgestore-infra`).

pub mod item;

pub use item::{generate_sku, CatalogSnapshot, StockItem, StockStatus};
