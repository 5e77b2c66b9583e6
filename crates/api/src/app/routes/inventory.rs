use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use forgestore_core::{PageParams, ProductId};
use forgestore_ledger::{generate_sku, StockItem};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

/// Ledger administration. All routes here are privileged: customers see
/// stock only through the catalog surface, which is out of scope for this
/// service.
pub fn router() -> Router {
    Router::new()
        .route("/items", post(create_item).get(list_items))
        .route("/items/:id", get(get_item))
        .route("/items/:id/threshold", put(set_threshold))
        .route("/items/:id/active", put(set_active))
        .route("/items/:id/restock", post(restock))
        .route("/summary", get(summary))
        .route("/low-stock", get(low_stock))
        .route("/out-of-stock", get(out_of_stock))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    let product_id = ProductId::new();
    let sku = body
        .sku
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| generate_sku(Utc::now(), Uuid::now_v7()));

    let item = match StockItem::new(
        product_id,
        sku,
        body.name,
        body.unit_price_cents,
        body.quantity,
        body.low_stock_threshold,
        Utc::now(),
    ) {
        Ok(item) => item,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger.insert(item.clone()) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "item registered",
                "data": dto::item_to_json(&item),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    let params = PageParams::new(query.page, query.limit);
    match services.ledger.list(params) {
        Ok(page) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": dto::page_to_json(&page, dto::item_to_json),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger.get(product_id) {
        Ok(item) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": dto::item_to_json(&item),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn set_threshold(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ThresholdRequest>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .ledger
        .set_low_stock_threshold(product_id, body.low_stock_threshold)
    {
        Ok(item) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "threshold updated",
                "data": dto::item_to_json(&item),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn set_active(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetActiveRequest>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let message = if body.active {
        "item activated"
    } else {
        "item deactivated"
    };

    match services.ledger.set_active(product_id, body.active) {
        Ok(item) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": message,
                "data": dto::item_to_json(&item),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn restock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::RestockRequest>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger.restock(product_id, body.quantity) {
        Ok(item) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "stock received",
                "data": dto::item_to_json(&item),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    match services.analytics.summary() {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": dto::summary_to_json(&summary),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn low_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    match services.analytics.low_stock() {
        Ok(items) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "items": items.iter().map(dto::item_to_json).collect::<Vec<_>>(),
                    "count": items.len(),
                },
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn out_of_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    match services.analytics.out_of_stock() {
        Ok(items) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "items": items.iter().map(dto::item_to_json).collect::<Vec<_>>(),
                    "count": items.len(),
                },
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
