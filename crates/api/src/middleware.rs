use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use marketedge_auth::PermissionResolver;
use marketedge_session::ACCESS_COOKIE;

use crate::app::errors::{auth_error_response, json_error};

#[derive(Clone)]
pub struct AuthState {
    pub resolver: Arc<PermissionResolver>,
}

/// Blocking authentication gate for all tenant-scoped routes.
///
/// Extracts the access token (bearer header preferred, cookie fallback),
/// runs the verifier chain, and stashes the resolved [`TenantContext`] as a
/// request extension. Verification must finish before any handler runs.
///
/// [`TenantContext`]: marketedge_auth::TenantContext
pub async fn auth_middleware(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token(req.headers(), &jar) else {
        return json_error(
            axum::http::StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        );
    };

    match state.resolver.resolve(&token, Utc::now()) {
        Ok(context) => {
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "request credential rejected");
            auth_error_response(&e)
        }
    }
}

/// Bearer header first; non-cookie clients use it exclusively. The cookie is
/// the browser transport.
fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    if let Some(header) = headers.get(axum::http::header::AUTHORIZATION) {
        let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            return None;
        }
        return Some(token.to_string());
    }

    jar.get(ACCESS_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|v| !v.is_empty())
}
