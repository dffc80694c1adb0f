//! Token issuance and rotation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use marketedge_auth::{AuthError, Claims, Principal, TokenType, TokenValidationError, validate_claims};
use marketedge_core::FamilyId;

use crate::family::{FamilyRecord, FamilyStore, FamilyStoreError, RotationOutcome};
use crate::verifier::hs256_signature_validation;

/// Signing secret and TTL policy, assembled once at startup.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// Default TTLs: 30 minutes access, 7 days refresh.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::minutes(30),
            refresh_ttl: Duration::days(7),
        }
    }
}

/// The pair handed to the session transport after login or rotation.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    /// Access-token lifetime in seconds (OAuth2-style `expires_in`).
    pub expires_in: i64,
}

/// Mints and rotates the internal token pair.
pub struct TokenIssuer {
    header: Header,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    families: Arc<dyn FamilyStore>,
}

impl TokenIssuer {
    pub fn new(config: TokenConfig, families: Arc<dyn FamilyStore>) -> Self {
        Self {
            header: Header::new(Algorithm::HS256),
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation: hs256_signature_validation(),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            families,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Mint a fresh pair for a principal, opening a new rotation family.
    pub fn issue(&self, principal: &Principal) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let family_id = FamilyId::new();

        let access = Claims::access(principal, now, self.access_ttl);
        let refresh = Claims::refresh(principal, family_id, now, self.refresh_ttl);

        self.families
            .create(FamilyRecord {
                family_id,
                tenant_id: principal.tenant_id,
                principal_id: principal.id,
                current_jti: refresh.jti,
                revoked: false,
            })
            .map_err(store_error)?;

        Ok(TokenPair {
            access: self.encode(&access)?,
            refresh: self.encode(&refresh)?,
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    /// Exchange a refresh token for a new pair, retiring the old one.
    ///
    /// Presenting a retired token revokes its whole family and yields
    /// [`AuthError::TokenReplay`]; of two concurrent rotations of the same
    /// token exactly one wins (the family store serializes the swap).
    pub fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let claims = self.decode(refresh_token)?;

        match validate_claims(&claims, now, TokenType::Refresh) {
            Ok(()) => {}
            Err(TokenValidationError::Expired) => return Err(AuthError::TokenExpired),
            Err(e) => {
                tracing::warn!(error = %e, "rejected refresh token during rotation");
                return Err(AuthError::TokenInvalid(e.to_string()));
            }
        }

        let family_id = claims
            .family_id
            .ok_or_else(|| AuthError::TokenInvalid("refresh token without family".to_string()))?;

        let principal = claims.to_principal();
        let next_access = Claims::access(&principal, now, self.access_ttl);
        let next_refresh = Claims::refresh(&principal, family_id, now, self.refresh_ttl);

        match self
            .families
            .rotate(family_id, claims.jti, next_refresh.jti)
            .map_err(store_error)?
        {
            RotationOutcome::Rotated => Ok(TokenPair {
                access: self.encode(&next_access)?,
                refresh: self.encode(&next_refresh)?,
                expires_in: self.access_ttl.num_seconds(),
            }),
            RotationOutcome::Replayed => {
                tracing::warn!(
                    family_id = %family_id,
                    tenant_id = %claims.tenant_id,
                    principal_id = %claims.sub,
                    "refresh token replay detected; family revoked"
                );
                Err(AuthError::TokenReplay)
            }
            RotationOutcome::Revoked => {
                tracing::warn!(
                    family_id = %family_id,
                    tenant_id = %claims.tenant_id,
                    "rotation attempted on a revoked family"
                );
                Err(AuthError::TokenReplay)
            }
            RotationOutcome::UnknownFamily => {
                tracing::warn!(family_id = %family_id, "rotation attempted on unknown family");
                Err(AuthError::TokenInvalid("unknown token family".to_string()))
            }
        }
    }

    /// Revoke the family of a presented refresh token (logout).
    ///
    /// Expiry is ignored: a signature-valid but expired token still names the
    /// family the caller wants dead.
    pub fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self.decode(refresh_token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::TokenInvalid(
                "only refresh tokens carry a revocable family".to_string(),
            ));
        }

        let family_id = claims
            .family_id
            .ok_or_else(|| AuthError::TokenInvalid("refresh token without family".to_string()))?;

        self.families.revoke(family_id).map_err(store_error)?;
        tracing::info!(family_id = %family_id, tenant_id = %claims.tenant_id, "token family revoked");
        Ok(())
    }

    fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&self.header, claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {e}")))
    }

    /// Signature check + claim decoding only; temporal validation is separate
    /// so expired tokens are distinguishable from forged ones.
    fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!(error = %e, "token signature verification failed");
                AuthError::TokenInvalid(e.to_string())
            })
    }
}

fn store_error(e: FamilyStoreError) -> AuthError {
    AuthError::Internal(format!("family store: {e}"))
}
