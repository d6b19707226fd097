use std::sync::Arc;

use axum::{
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use rentdesk_auth::{AccountParams, AccountPatch, NewAccount};
use rentdesk_core::UserId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route("/realtors", get(list_realtors))
        .route("/:id", get(get_account).put(update_account).delete(delete_account))
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    query: Result<Query<AccountParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match services.engine.list_accounts(caller.identity(), &params).await {
        Ok(page) => (StatusCode::OK, Json(dto::AccountPageResponse::from(page))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_realtors(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.engine.realtors(caller.identity()).await {
        Ok(users) => (StatusCode::OK, Json(dto::RealtorsResponse { users })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<NewAccount>, JsonRejection>,
) -> axum::response::Response {
    let Json(payload) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.guard.create_account(caller.identity(), payload).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.engine.account(caller.identity(), id).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<AccountPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: UserId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.guard.update_account(caller.identity(), id, patch).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.guard.delete_account(caller.identity(), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
