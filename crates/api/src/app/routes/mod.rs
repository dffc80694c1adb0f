use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod system;
pub mod tenants;

/// Routes reachable without an access token (login and session maintenance).
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
}

/// Routes behind the authentication gate (tenant-scoped).
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/tenants/:tenant_id/reports", get(tenants::reports))
}
