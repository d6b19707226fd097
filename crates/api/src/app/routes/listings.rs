use std::sync::Arc;

use axum::{
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use rentdesk_core::ListingId;
use rentdesk_listings::{ListingParams, ListingPatch, NewListing};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_listings).post(create_listing))
        .route("/all", get(list_all_listings))
        .route("/:id", put(update_listing).delete(delete_listing))
}

pub async fn list_listings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    query: Result<Query<ListingParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match services.engine.list(caller.identity(), &params).await {
        Ok(page) => (StatusCode::OK, Json(dto::ListingPageResponse::from(page))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_all_listings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    query: Result<Query<ListingParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match services.engine.list_all(caller.identity(), &params).await {
        Ok(page) => (StatusCode::OK, Json(dto::ListingPageResponse::from(page))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_listing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<NewListing>, JsonRejection>,
) -> axum::response::Response {
    let Json(payload) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.guard.create_listing(caller.identity(), payload).await {
        Ok(listing) => (StatusCode::CREATED, Json(listing)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_listing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<ListingPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: ListingId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.guard.update_listing(caller.identity(), id, patch).await {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_listing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ListingId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.guard.delete_listing(caller.identity(), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
