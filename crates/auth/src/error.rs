//! Authentication error taxonomy.

use thiserror::Error;

/// Authentication failure.
///
/// Every variant surfaces to clients as a structured body with the stable
/// code from [`AuthError::code`]; internal detail strings are for logs and
/// never echo upstream provider responses verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The authorization code was rejected by the upstream provider, or the
    /// resulting profile is unusable (e.g. no tenant binding).
    #[error("invalid grant: {0}")]
    InvalidGrant(String),

    /// Malformed input (bad redirect URI, oversized code). Not retryable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream provider could not be reached or answered 5xx. Retryable.
    #[error("identity provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Presented token is past its expiry. Caller must force a full re-login.
    #[error("token expired")]
    TokenExpired,

    /// Signature mismatch, malformed token, or wrong token type.
    /// Treated as a security event.
    #[error("token invalid: {0}")]
    TokenInvalid(String),

    /// A retired refresh token was presented again. The whole family is
    /// invalidated as a precaution.
    #[error("refresh token replay detected")]
    TokenReplay,

    /// Infrastructure fault inside the auth path (never detailed to clients).
    #[error("internal auth failure: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable error code for HTTP bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidGrant(_) => "invalid_grant",
            AuthError::InvalidRequest(_) => "invalid_request",
            AuthError::UpstreamUnavailable(_) => "upstream_unavailable",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenInvalid(_) => "token_invalid",
            AuthError::TokenReplay => "token_replay",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Whether a caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::UpstreamUnavailable(_))
    }
}
