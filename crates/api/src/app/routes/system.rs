use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::context::CallerContext;

/// Liveness probe; deliberately outside the identity middleware.
pub async fn health() -> axum::response::Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "status": "ok" },
        })),
    )
        .into_response()
}

/// Echo of the resolved caller identity (useful for gateway debugging).
pub async fn whoami(Extension(caller): Extension<CallerContext>) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "user_id": caller.user_id().to_string(),
                "role": match caller.role() {
                    crate::context::Role::Admin => "admin",
                    crate::context::Role::Customer => "customer",
                },
            },
        })),
    )
        .into_response()
}
