use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use marketedge_core::{FamilyId, TenantId};

use crate::{Industry, Permission, Principal, PrincipalId, Role};

/// Discriminates access tokens from refresh tokens.
///
/// Serialized as the `type` claim; the resolver rejects refresh tokens
/// presented as request credentials, and the issuer rejects access tokens
/// presented for rotation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Internal token claims (transport-agnostic).
///
/// This is the full claim set MarketEdge embeds in its own JWTs. `iat`/`exp`
/// are Unix seconds as is conventional on the wire; use [`Claims::issued_at`]
/// and [`Claims::expires_at`] for `chrono` views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Principal email (informational, never used for authorization).
    pub email: String,

    /// Tenant context for the token.
    pub tenant_id: TenantId,

    /// Role granted within the tenant context.
    pub role: Role,

    /// Effective permissions within the tenant context.
    pub permissions: Vec<Permission>,

    /// Industry tag for frontend view selection.
    pub industry: Industry,

    /// Access vs refresh.
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiration (Unix seconds).
    pub exp: i64,

    /// Unique token id.
    pub jti: Uuid,

    /// Rotation family (refresh tokens only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_id: Option<FamilyId>,
}

impl Claims {
    /// Claims for a fresh access token.
    pub fn access(principal: &Principal, issued_at: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            sub: principal.id,
            email: principal.email.clone(),
            tenant_id: principal.tenant_id,
            role: principal.role.clone(),
            permissions: principal.permissions.clone(),
            industry: principal.industry.clone(),
            token_type: TokenType::Access,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::now_v7(),
            family_id: None,
        }
    }

    /// Claims for a fresh refresh token in the given rotation family.
    pub fn refresh(
        principal: &Principal,
        family_id: FamilyId,
        issued_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            sub: principal.id,
            email: principal.email.clone(),
            tenant_id: principal.tenant_id,
            role: principal.role.clone(),
            permissions: principal.permissions.clone(),
            industry: principal.industry.clone(),
            token_type: TokenType::Refresh,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::now_v7(),
            family_id: Some(family_id),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Reconstruct the principal view embedded in these claims.
    pub fn to_principal(&self) -> Principal {
        Principal {
            id: self.sub,
            email: self.email.clone(),
            tenant_id: self.tenant_id,
            role: self.role.clone(),
            permissions: self.permissions.clone(),
            industry: self.industry.clone(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("unexpected token type")]
    WrongType,
}

/// Deterministically validate claims against the clock and expected type.
///
/// Note: this validates the *claims* only. Signature verification / decoding is
/// intentionally outside this crate.
pub fn validate_claims(
    claims: &Claims,
    now: DateTime<Utc>,
    expected: TokenType,
) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now.timestamp() < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now.timestamp() >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    if claims.token_type != expected {
        return Err(TokenValidationError::WrongType);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_principal() -> Principal {
        Principal {
            id: PrincipalId::new(),
            email: "a@b.com".to_string(),
            tenant_id: TenantId::new(),
            role: Role::new("analyst"),
            permissions: vec![Permission::new("reports.read")],
            industry: Industry::new("cinema"),
        }
    }

    #[test]
    fn access_claims_span_equals_ttl() {
        let now = Utc::now();
        let claims = Claims::access(&test_principal(), now, Duration::minutes(30));
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.family_id.is_none());

        // Sub-second precision is dropped at the Unix-seconds boundary.
        let span = claims.expires_at().unwrap() - claims.issued_at().unwrap();
        assert_eq!(span, Duration::minutes(30));
    }

    #[test]
    fn validate_rejects_expired() {
        let issued = Utc::now() - Duration::hours(2);
        let claims = Claims::access(&test_principal(), issued, Duration::minutes(30));
        assert_eq!(
            validate_claims(&claims, Utc::now(), TokenType::Access),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn validate_rejects_future_iat() {
        let issued = Utc::now() + Duration::hours(1);
        let claims = Claims::access(&test_principal(), issued, Duration::minutes(30));
        assert_eq!(
            validate_claims(&claims, Utc::now(), TokenType::Access),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn validate_rejects_wrong_type() {
        let claims = Claims::refresh(
            &test_principal(),
            marketedge_core::FamilyId::new(),
            Utc::now(),
            Duration::days(7),
        );
        assert_eq!(
            validate_claims(&claims, Utc::now(), TokenType::Access),
            Err(TokenValidationError::WrongType)
        );
    }

    #[test]
    fn claims_round_trip_through_json() {
        let principal = test_principal();
        let claims = Claims::access(&principal, Utc::now(), Duration::minutes(30));

        let encoded = serde_json::to_string(&claims).unwrap();
        let decoded: Claims = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.tenant_id, principal.tenant_id);
        assert_eq!(decoded.role, principal.role);
        assert_eq!(decoded.permissions, principal.permissions);
        assert_eq!(decoded, claims);
    }

    #[test]
    fn token_type_serializes_as_type_claim() {
        let claims = Claims::access(&test_principal(), Utc::now(), Duration::minutes(30));
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["type"], "access");
    }
}
