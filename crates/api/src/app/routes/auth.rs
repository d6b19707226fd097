use std::sync::Arc;

use axum::{
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use rentdesk_auth::NewAccount;
use rentdesk_infra::LoginRequest;

use crate::app::errors;
use crate::app::services::AppServices;

/// Public credential endpoints (no token required).
pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.auth.login(request).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewAccount>, JsonRejection>,
) -> axum::response::Response {
    let Json(payload) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.auth.signup(payload).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
