use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;

use forgestore_core::ProductId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_cart))
        .route("/add", post(add_to_cart))
        .route("/update", put(update_cart_item))
        .route("/remove/:product_id", delete(remove_cart_item))
        .route("/clear", delete(clear_cart))
        .route("/count", get(cart_count))
}

pub async fn get_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.carts.get(caller.user_id()) {
        Ok(cart) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": dto::cart_to_json(&cart, &services.ledger),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn add_to_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::AddCartItemRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match body.product_id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let quantity = body.quantity.unwrap_or(1);

    match services
        .carts
        .add_or_increment(caller.user_id(), product_id, quantity)
    {
        Ok(cart) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "item added to cart",
                "data": dto::cart_to_json(&cart, &services.ledger),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_cart_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::UpdateCartItemRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match body.product_id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .carts
        .set_quantity(caller.user_id(), product_id, body.quantity)
    {
        Ok(cart) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "cart updated",
                "data": dto::cart_to_json(&cart, &services.ledger),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove_cart_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match product_id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.carts.remove(caller.user_id(), product_id) {
        Ok(cart) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "item removed from cart",
                "data": dto::cart_to_json(&cart, &services.ledger),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn clear_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.carts.clear(caller.user_id()) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "cart cleared",
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn cart_count(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.carts.item_count(caller.user_id()) {
        Ok(count) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "count": count },
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
