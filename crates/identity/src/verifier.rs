//! Upstream-token verification strategy (resolver fallback).
//!
//! During the migration window clients may still present provider-minted
//! tokens. This verifier accepts them, checks issuer/audience, and projects
//! the upstream claims onto the internal claim shape so everything downstream
//! sees one format.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use marketedge_auth::{
    Claims, Industry, Role, TokenType, TokenVerifier, permissions_for_role, validate_claims,
};

use crate::profile::{principal_id_for_subject, tenant_id_for_org};

/// Issuer/audience the upstream provider stamps into its tokens.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub issuer: String,
    pub audience: String,
}

/// Claim shape of the provider's own access tokens.
#[derive(Debug, Deserialize)]
struct UpstreamTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    iat: i64,
    exp: i64,
    #[serde(default)]
    org_id: Option<String>,
    #[serde(default)]
    industry: Option<String>,
}

pub struct UpstreamVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl UpstreamVerifier {
    /// Shared-secret provider configuration (also what the tests use).
    pub fn hs256(config: &UpstreamConfig, secret: &[u8]) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
            validation: Self::validation_for(config, Algorithm::HS256),
        }
    }

    /// Public-key provider configuration (RS256 PEM).
    pub fn rs256_pem(
        config: &UpstreamConfig,
        pem: &[u8],
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            decoding: DecodingKey::from_rsa_pem(pem)?,
            validation: Self::validation_for(config, Algorithm::RS256),
        })
    }

    fn validation_for(config: &UpstreamConfig, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        // Temporal checks run against the caller's clock below.
        validation.validate_exp = false;
        validation
    }
}

impl TokenVerifier for UpstreamVerifier {
    fn name(&self) -> &'static str {
        "upstream_oidc"
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<Claims> {
        let data =
            jsonwebtoken::decode::<UpstreamTokenClaims>(token, &self.decoding, &self.validation)
                .ok()?;
        let upstream = data.claims;

        // No organization claim means no tenant binding; such a token cannot
        // authenticate against tenant-scoped MarketEdge.
        let org = upstream.org_id.as_deref()?;

        let role = Role::new("viewer");
        let claims = Claims {
            sub: principal_id_for_subject(&upstream.sub),
            email: upstream.email.unwrap_or_default(),
            tenant_id: tenant_id_for_org(org),
            permissions: permissions_for_role(&role),
            role,
            industry: upstream
                .industry
                .map(Industry::new)
                .unwrap_or_else(Industry::unspecified),
            token_type: TokenType::Access,
            iat: upstream.iat,
            exp: upstream.exp,
            jti: Uuid::new_v5(&Uuid::NAMESPACE_OID, token.as_bytes()),
            family_id: None,
        };

        validate_claims(&claims, now, TokenType::Access).ok()?;
        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};

    const SECRET: &[u8] = b"upstream-secret";

    fn config() -> UpstreamConfig {
        UpstreamConfig {
            issuer: "https://id.example.com/".to_string(),
            audience: "marketedge-api".to_string(),
        }
    }

    fn mint(iss: &str, org_id: Option<&str>, issued: DateTime<Utc>) -> String {
        let claims = serde_json::json!({
            "sub": "auth0|u1",
            "email": "a@b.com",
            "iss": iss,
            "aud": "marketedge-api",
            "iat": issued.timestamp(),
            "exp": (issued + Duration::minutes(30)).timestamp(),
            "org_id": org_id,
        });
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    #[test]
    fn maps_upstream_claims_onto_the_internal_shape() {
        let verifier = UpstreamVerifier::hs256(&config(), SECRET);
        let token = mint("https://id.example.com/", Some("org_demo"), Utc::now());

        let claims = verifier.verify(&token, Utc::now()).unwrap();
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.tenant_id, tenant_id_for_org("org_demo"));
        assert_eq!(claims.sub, principal_id_for_subject("auth0|u1"));
        assert_eq!(claims.role.as_str(), "viewer");
    }

    #[test]
    fn rejects_a_foreign_issuer() {
        let verifier = UpstreamVerifier::hs256(&config(), SECRET);
        let token = mint("https://evil.example.com/", Some("org_demo"), Utc::now());

        assert!(verifier.verify(&token, Utc::now()).is_none());
    }

    #[test]
    fn rejects_an_expired_upstream_token() {
        let verifier = UpstreamVerifier::hs256(&config(), SECRET);
        let token = mint(
            "https://id.example.com/",
            Some("org_demo"),
            Utc::now() - Duration::hours(2),
        );

        assert!(verifier.verify(&token, Utc::now()).is_none());
    }

    #[test]
    fn rejects_a_token_without_tenant_binding() {
        let verifier = UpstreamVerifier::hs256(&config(), SECRET);
        let token = mint("https://id.example.com/", None, Utc::now());

        assert!(verifier.verify(&token, Utc::now()).is_none());
    }
}
