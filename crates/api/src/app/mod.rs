//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, hasher and token wiring
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: response DTOs and path helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use rentdesk_auth::{Hs256Jwt, JwtValidator};

use crate::config::AppConfig;
use crate::middleware;
use self::services::AppServices;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let jwt = Arc::new(Hs256Jwt::new(&config.token));
    let services = services::build_services(config, jwt.clone()).await?;
    Ok(router(Arc::new(services), jwt))
}

/// Assemble the router over already-built services.
pub fn router(services: Arc<AppServices>, jwt: Arc<dyn JwtValidator>) -> Router {
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a verified identity.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
