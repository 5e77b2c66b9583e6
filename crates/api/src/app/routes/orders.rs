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

use forgestore_core::{AddressId, OrderId, PageParams, ProductId};
use forgestore_orders::{OrderStatus, PaymentMethod, PaymentStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_my_orders))
        .route("/all", get(list_all_orders))
        .route("/:id", get(get_order))
        .route("/:id/cancel", put(cancel_order))
        .route("/:id/status", put(update_order_status))
        .route("/:id/payment", put(update_payment_status))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let mut lines: Vec<(ProductId, i64)> = Vec::with_capacity(body.lines.len());
    for line in &body.lines {
        let product_id: ProductId = match line.product_id.parse() {
            Ok(v) => v,
            Err(e) => return errors::domain_error_to_response(e),
        };
        lines.push((product_id, line.quantity));
    }

    let address_id: AddressId = match body.address_id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let payment_method: PaymentMethod = match body.payment_method.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.composer.compose(
        caller.user_id(),
        &lines,
        address_id,
        payment_method,
        body.discount_cents.unwrap_or(0),
        Utc::now(),
    ) {
        Ok(order) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "order placed",
                "data": dto::order_to_json(&order),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_my_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    let params = PageParams::new(query.page, query.limit);
    match services.orders.list_for_user(caller.user_id(), params) {
        Ok(page) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": dto::page_to_json(&page, dto::order_to_json),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_all_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    let params = PageParams::new(query.page, query.limit);
    match services.orders.list_all(params) {
        Ok(page) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": dto::page_to_json(&page, dto::order_to_json),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let result = if caller.is_admin() {
        services.orders.get(order_id)
    } else {
        services.orders.get_owned(order_id, caller.user_id())
    };

    match result {
        Ok(order) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": dto::order_to_json(&order),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn cancel_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .lifecycle
        .cancel(order_id, caller.user_id(), Utc::now())
    {
        Ok(order) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "order canceled",
                "data": dto::order_to_json(&order),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_order_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOrderStatusRequest>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let status: OrderStatus = match body.status.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.lifecycle.transition(
        order_id,
        status,
        Some(caller.user_id()),
        body.notes,
        Utc::now(),
    ) {
        Ok(order) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "order status updated",
                "data": dto::order_to_json(&order),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_payment_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdatePaymentStatusRequest>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_admin(&caller) {
        return resp;
    }

    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let status: PaymentStatus = match body.payment_status.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.lifecycle.set_payment_status(order_id, status) {
        Ok(order) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "payment status updated",
                "data": dto::order_to_json(&order),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
