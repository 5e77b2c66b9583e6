use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use forgestore_core::UserId;

use crate::context::{CallerContext, Role};

/// Identity is an external collaborator: an upstream gateway authenticates
/// the caller and forwards the resolved identity in headers. This middleware
/// only turns those headers into a [`CallerContext`] — it performs no
/// authentication of its own.
pub async fn identity_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let caller = resolve_caller(req.headers())?;
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

fn resolve_caller(headers: &HeaderMap) -> Result<CallerContext, StatusCode> {
    let raw = headers
        .get("x-user-id")
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user_id: UserId = raw.trim().parse().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let role = match headers.get("x-role").and_then(|v| v.to_str().ok()) {
        Some(role) if role.eq_ignore_ascii_case("admin") => Role::Admin,
        _ => Role::Customer,
    };

    Ok(CallerContext::new(user_id, role))
}
