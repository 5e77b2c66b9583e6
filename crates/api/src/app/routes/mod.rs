use axum::{routing::get, Router};

pub mod cart;
pub mod inventory;
pub mod orders;
pub mod system;

/// Router for all identity-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/inventory", inventory::router())
}
