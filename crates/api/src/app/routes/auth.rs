//! Login, refresh, logout, and session introspection.

use std::sync::Arc;

use axum::{
    Extension, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use marketedge_auth::TenantContext;
use marketedge_session::{REFRESH_COOKIE, attach, clear};

use crate::app::dto::{LoginRequest, RefreshRequest, SessionResponse, TokenResponse};
use crate::app::errors::{auth_error_response, json_error};
use crate::app::services::AppServices;

/// One-time authorization-code exchange: upstream profile → principal →
/// internal token pair, attached as cookies and echoed in the body.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Response {
    let profile = match services
        .provider
        .exchange_code(&request.code, &request.redirect_uri)
        .await
    {
        Ok(profile) => profile,
        Err(e) => return auth_error_response(&e),
    };

    let principal = match profile.to_principal() {
        Ok(principal) => principal,
        Err(e) => return auth_error_response(&e),
    };

    let pair = match services.issuer.issue(&principal) {
        Ok(pair) => pair,
        Err(e) => return auth_error_response(&e),
    };

    tracing::info!(
        principal_id = %principal.id,
        tenant_id = %principal.tenant_id,
        "login succeeded"
    );

    let jar = attach(jar, &pair, &services.policy);
    (jar, Json(SessionResponse::new(&pair, &principal))).into_response()
}

/// Rotate the refresh token. The presented token is retired; replaying it
/// later kills the whole family.
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Response {
    let presented = body
        .and_then(|Json(request)| request.refresh_token)
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()));

    let Some(token) = presented else {
        return json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "no refresh token presented",
        );
    };

    match services.issuer.rotate(&token) {
        Ok(pair) => {
            let jar = attach(jar, &pair, &services.policy);
            (jar, Json(TokenResponse::from_pair(&pair))).into_response()
        }
        Err(e) => auth_error_response(&e),
    }
}

/// Revoke the session's token family and drop both cookies.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Response {
    let presented = body
        .and_then(|Json(request)| request.refresh_token)
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()));

    if let Some(token) = presented {
        // A bad token on logout is not worth failing the request over; the
        // cookies get cleared either way.
        if let Err(e) = services.issuer.revoke(&token) {
            tracing::debug!(error = %e, "logout presented an unusable refresh token");
        }
    }

    let jar = clear(jar, &services.policy);
    (jar, StatusCode::NO_CONTENT).into_response()
}

/// Echo the resolved tenant context for the presented token.
pub async fn me(Extension(context): Extension<TenantContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "principal_id": context.principal_id().to_string(),
        "tenant_id": context.tenant_id().to_string(),
        "role": context.role().as_str(),
        "permissions": context.permissions().iter().map(|p| p.as_str()).collect::<Vec<_>>(),
        "industry": context.industry().as_str(),
    }))
}
