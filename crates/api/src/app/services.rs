//! Service wiring: one shared set of stores behind the handlers.

use std::sync::Arc;

use forgestore_infra::{
    AddressDirectory, CartStore, ComposerConfig, InventoryAnalytics, LedgerStore, OrderComposer,
    OrderLifecycle, OrderStore,
};

/// Everything the handlers need, wired over one shared ledger.
#[derive(Debug)]
pub struct AppServices {
    pub ledger: Arc<LedgerStore>,
    pub carts: Arc<CartStore>,
    pub orders: Arc<OrderStore>,
    pub directory: Arc<AddressDirectory>,
    pub composer: OrderComposer,
    pub lifecycle: OrderLifecycle,
    pub analytics: InventoryAnalytics,
}

/// Wire the in-memory stores. The address directory stands in for the
/// external address service; deployments replace the seeding path with a
/// real client.
pub fn build_services(config: ComposerConfig) -> AppServices {
    let ledger = Arc::new(LedgerStore::new());
    let carts = Arc::new(CartStore::new(ledger.clone()));
    let orders = Arc::new(OrderStore::new());
    let directory = Arc::new(AddressDirectory::new());

    AppServices {
        composer: OrderComposer::new(
            ledger.clone(),
            carts.clone(),
            orders.clone(),
            directory.clone(),
            config,
        ),
        lifecycle: OrderLifecycle::new(orders.clone(), ledger.clone()),
        analytics: InventoryAnalytics::new(ledger.clone()),
        ledger,
        carts,
        orders,
        directory,
    }
}
