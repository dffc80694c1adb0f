//! Request/response DTOs for the auth endpoints.

use serde::{Deserialize, Serialize};

use marketedge_auth::Principal;
use marketedge_tokens::TokenPair;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub code: String,
    pub redirect_uri: String,
}

/// Refresh token may come in the body (non-cookie clients) or ride the
/// httpOnly cookie (browsers).
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PrincipalSummary {
    pub id: String,
    pub email: String,
    pub tenant_id: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub industry: String,
}

impl PrincipalSummary {
    pub fn from_principal(principal: &Principal) -> Self {
        Self {
            id: principal.id.to_string(),
            email: principal.email.clone(),
            tenant_id: principal.tenant_id.to_string(),
            role: principal.role.as_str().to_string(),
            permissions: principal
                .permissions
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
            industry: principal.industry.as_str().to_string(),
        }
    }
}

/// Token pair echoed in the body so non-cookie clients can store it.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn from_pair(pair: &TokenPair) -> Self {
        Self {
            access_token: pair.access.clone(),
            refresh_token: pair.refresh.clone(),
            expires_in: pair.expires_in,
        }
    }
}

/// Login response: tokens plus the freshly mapped principal.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub tokens: TokenResponse,
    pub principal: PrincipalSummary,
}

impl SessionResponse {
    pub fn new(pair: &TokenPair, principal: &Principal) -> Self {
        Self {
            tokens: TokenResponse::from_pair(pair),
            principal: PrincipalSummary::from_principal(principal),
        }
    }
}
