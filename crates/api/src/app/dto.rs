use serde::Deserialize;
use serde_json::json;

use forgestore_cart::Cart;
use forgestore_core::Page;
use forgestore_infra::{InventorySummary, LedgerStore};
use forgestore_ledger::StockItem;
use forgestore_orders::Order;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: String,
    /// Defaults to 1, matching the storefront's "add to cart" button.
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub lines: Vec<OrderLineRequest>,
    pub address_id: String,
    pub payment_method: String,
    pub discount_cents: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    /// Generated (`SKU-...`) when absent.
    pub sku: Option<String>,
    pub name: String,
    pub unit_price_cents: u64,
    pub quantity: i64,
    pub low_stock_threshold: i64,
}

#[derive(Debug, Deserialize)]
pub struct ThresholdRequest {
    pub low_stock_threshold: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn item_to_json(item: &StockItem) -> serde_json::Value {
    json!({
        "id": item.id().to_string(),
        "sku": item.sku(),
        "name": item.name(),
        "unit_price_cents": item.unit_price_cents(),
        "quantity_on_hand": item.quantity_on_hand(),
        "low_stock_threshold": item.low_stock_threshold(),
        "is_active": item.is_active(),
        "status": item.status(),
    })
}

/// Cart view enriched with the ledger's currently visible name/price/stock
/// (advisory display data; the authoritative check happens at composition).
pub fn cart_to_json(cart: &Cart, ledger: &LedgerStore) -> serde_json::Value {
    let items: Vec<serde_json::Value> = cart
        .lines()
        .iter()
        .map(|line| {
            let visible = ledger.get(line.product_id).ok();
            json!({
                "product_id": line.product_id.to_string(),
                "quantity": line.quantity,
                "product_name": visible.as_ref().map(|i| i.name().to_string()),
                "unit_price_cents": visible.as_ref().map(|i| i.unit_price_cents()),
                "available": visible.as_ref().map(|i| i.quantity_on_hand()),
            })
        })
        .collect();

    json!({
        "user_id": cart.user_id().to_string(),
        "items": items,
        "item_count": cart.item_count(),
    })
}

pub fn order_to_json(order: &Order) -> serde_json::Value {
    let lines: Vec<serde_json::Value> = order
        .lines()
        .iter()
        .map(|line| {
            json!({
                "product_id": line.product_id.to_string(),
                "product_name": line.product_name,
                "sku": line.sku,
                "unit_price_cents": line.unit_price_cents,
                "quantity": line.quantity,
                "line_total_cents": line.line_total_cents,
            })
        })
        .collect();

    let history: Vec<serde_json::Value> = order
        .status_history()
        .iter()
        .map(|entry| {
            json!({
                "status": entry.status,
                "timestamp": entry.timestamp,
                "actor": entry.actor.map(|a| a.to_string()),
                "notes": entry.notes,
            })
        })
        .collect();

    json!({
        "id": order.id().to_string(),
        "order_number": order.order_number().to_string(),
        "user_id": order.user_id().to_string(),
        "items": lines,
        "address_id": order.address_id().to_string(),
        "payment_method": order.payment_method(),
        "pricing": {
            "subtotal_cents": order.pricing().subtotal_cents,
            "shipping_cost_cents": order.pricing().shipping_cost_cents,
            "tax_cents": order.pricing().tax_cents,
            "discount_cents": order.pricing().discount_cents,
            "total_cents": order.pricing().total_cents,
        },
        "order_status": order.order_status(),
        "payment_status": order.payment_status(),
        "status_history": history,
        "created_at": order.created_at(),
        "shipped_at": order.shipped_at(),
        "delivered_at": order.delivered_at(),
    })
}

pub fn summary_to_json(summary: &InventorySummary) -> serde_json::Value {
    json!({
        "total_items": summary.total_items,
        "total_value_cents": summary.total_value_cents,
        "low_stock_count": summary.low_stock_count,
        "out_of_stock_count": summary.out_of_stock_count,
    })
}

/// List-endpoint envelope body: items plus pagination counters.
pub fn page_to_json<T>(page: &Page<T>, to_json: impl Fn(&T) -> serde_json::Value) -> serde_json::Value {
    json!({
        "items": page.items.iter().map(to_json).collect::<Vec<_>>(),
        "pagination": {
            "current_page": page.current_page,
            "total_pages": page.total_pages,
            "total_items": page.total_items,
        },
    })
}
