use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use marketedge_auth::{AuthError, AuthzError};
use marketedge_core::DomainError;

/// Structured error body: stable code + human-readable message, never a
/// stack trace or an upstream provider's raw response.
pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 401-class errors say "who are you"; they drive the client back to login.
pub fn auth_error_response(err: &AuthError) -> axum::response::Response {
    match err {
        AuthError::InvalidRequest(_) => json_error(StatusCode::BAD_REQUEST, err.code(), err.to_string()),
        AuthError::InvalidGrant(_)
        | AuthError::TokenExpired
        | AuthError::TokenInvalid(_)
        | AuthError::TokenReplay => json_error(StatusCode::UNAUTHORIZED, err.code(), err.to_string()),
        AuthError::UpstreamUnavailable(_) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            err.code(),
            "identity service temporarily unavailable",
        ),
        AuthError::Internal(detail) => {
            tracing::error!(detail = %detail, "internal auth failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.code(),
                "internal error",
            )
        }
    }
}

/// 403-class errors say "you are known, but not entitled"; the client shows
/// an access-denied screen instead of re-authenticating.
pub fn authz_error_response(err: &AuthzError) -> axum::response::Response {
    let code = match err {
        AuthzError::TenantMismatch => "tenant_mismatch",
        AuthzError::Forbidden(_) => "forbidden",
    };
    json_error(StatusCode::FORBIDDEN, code, err.to_string())
}

pub fn domain_error_response(err: &DomainError) -> axum::response::Response {
    let code = match err {
        DomainError::Validation(_) => "validation_error",
        DomainError::InvalidId(_) => "invalid_id",
    };
    json_error(StatusCode::BAD_REQUEST, code, err.to_string())
}
