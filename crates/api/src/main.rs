use std::sync::Arc;

use forgestore_infra::ComposerConfig;

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(%name, %raw, "invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(%name, %raw, "invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}

#[tokio::main]
async fn main() {
    forgestore_observability::init();

    let config = ComposerConfig {
        shipping_cost_cents: env_u64("SHIPPING_COST_CENTS", 1099),
        tax_rate_bps: env_u32("TAX_RATE_BPS", 0),
    };

    let services = Arc::new(forgestore_api::app::services::build_services(config));
    let app = forgestore_api::app::build_app(services);

    let bind = std::env::var("FORGESTORE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
