use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use forgestore_core::DomainError;

use crate::context::CallerContext;

/// Map a domain error onto the response envelope.
///
/// `InsufficientStock` additionally carries the available quantity in
/// `data` so the client can adjust the order instead of guessing.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvalidTransition { ref from, ref to } => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_transition",
            format!("cannot transition from {from} to {to}"),
        ),
        DomainError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        DomainError::InsufficientStock {
            product_id,
            requested,
            available,
        } => (
            StatusCode::CONFLICT,
            axum::Json(json!({
                "success": false,
                "error": "insufficient_stock",
                "message": format!("only {available} items available in stock"),
                "data": {
                    "product_id": product_id.to_string(),
                    "requested": requested,
                    "available": available,
                },
            })),
        )
            .into_response(),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::Internal(msg) => {
            tracing::error!(%msg, "internal error");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Gate for privileged routes.
pub fn require_admin(caller: &CallerContext) -> Result<(), axum::response::Response> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "admin role required",
        ))
    }
}
