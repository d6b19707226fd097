use axum::{routing::get, Router};

pub mod accounts;
pub mod auth;
pub mod listings;
pub mod system;

/// Router for endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/auth", auth::router())
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/apartments", listings::router())
        .nest("/users", accounts::router())
}
