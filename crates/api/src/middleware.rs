use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use rentdesk_auth::JwtValidator;

use crate::app::errors::json_error;
use crate::context::CallerContext;

/// Alternate header carrying a bare token.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token(req.headers()).ok_or_else(|| {
        json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "A token is required for authentication")
    })?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "Invalid Token")
    })?;

    req.extensions_mut().insert(CallerContext::new(claims.identity()));

    Ok(next.run(req).await)
}

/// `Authorization: Bearer <token>`, falling back to `x-access-token: <token>`.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let token = match bearer {
        Some(token) => token,
        None => {
            // `x-access-token` may carry a bare token or `<scheme> <token>`.
            let raw = headers.get(ACCESS_TOKEN_HEADER)?.to_str().ok()?.trim();
            raw.split_once(' ').map_or(raw, |(_, token)| token)
        }
    }
    .trim();

    if token.is_empty() { None } else { Some(token) }
}
