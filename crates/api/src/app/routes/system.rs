use axum::{extract::Extension, http::StatusCode, Json};

use crate::app::dto::WhoamiResponse;
use crate::context::CallerContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(caller): Extension<CallerContext>) -> Json<WhoamiResponse> {
    Json(WhoamiResponse::from(caller.identity()))
}
