//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: service graph (provider adapter, issuer, verifier chain)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses (401 vs 403 never collapsed)

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let (app_services, resolver) = services::build_services(&config)?;
    let app_services = Arc::new(app_services);
    let auth_state = middleware::AuthState { resolver };

    let public = routes::public_router().layer(Extension(app_services.clone()));

    // Protected routes: token verification is a blocking gate ahead of every
    // handler.
    let protected = routes::protected_router().layer(
        ServiceBuilder::new()
            .layer(Extension(app_services))
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            )),
    );

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(public)
        .merge(protected))
}
