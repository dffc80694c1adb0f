//! Internal-token verification strategy (first in the resolver chain).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use marketedge_auth::{Claims, TokenVerifier, validate_claims};

/// Signature-only validation: temporal checks are done against the caller's
/// clock in `validate_claims`, not jsonwebtoken's system clock, so tests and
/// the resolver share one notion of "now".
pub(crate) fn hs256_signature_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = Default::default();
    validation
}

/// Verifies MarketEdge-minted HS256 tokens.
pub struct Hs256Verifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256Verifier {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
            validation: hs256_signature_validation(),
        }
    }
}

impl TokenVerifier for Hs256Verifier {
    fn name(&self) -> &'static str {
        "internal_hs256"
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<Claims> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation).ok()?;
        let claims = data.claims;

        // Type enforcement is the resolver's call; only the time window is
        // checked here.
        validate_claims(&claims, now, claims.token_type).ok()?;
        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use marketedge_auth::{Industry, Permission, Principal, PrincipalId, Role};
    use marketedge_core::TenantId;

    const SECRET: &[u8] = b"test-secret";

    fn encode(claims: &Claims, secret: &[u8]) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn test_principal() -> Principal {
        Principal {
            id: PrincipalId::new(),
            email: "a@b.com".to_string(),
            tenant_id: TenantId::new(),
            role: Role::new("viewer"),
            permissions: vec![Permission::new("reports.read")],
            industry: Industry::unspecified(),
        }
    }

    #[test]
    fn verifies_a_freshly_minted_token() {
        let claims = Claims::access(&test_principal(), Utc::now(), Duration::minutes(30));
        let token = encode(&claims, SECRET);

        let verifier = Hs256Verifier::new(SECRET);
        let decoded = verifier.verify(&token, Utc::now()).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_a_foreign_signature() {
        let claims = Claims::access(&test_principal(), Utc::now(), Duration::minutes(30));
        let token = encode(&claims, b"other-secret");

        let verifier = Hs256Verifier::new(SECRET);
        assert!(verifier.verify(&token, Utc::now()).is_none());
    }

    #[test]
    fn rejects_an_expired_token() {
        let claims = Claims::access(
            &test_principal(),
            Utc::now() - Duration::hours(1),
            Duration::minutes(30),
        );
        let token = encode(&claims, SECRET);

        let verifier = Hs256Verifier::new(SECRET);
        assert!(verifier.verify(&token, Utc::now()).is_none());
    }

    #[test]
    fn rejects_garbage_without_panicking() {
        let verifier = Hs256Verifier::new(SECRET);
        assert!(verifier.verify("not-a-jwt", Utc::now()).is_none());
        assert!(verifier.verify("", Utc::now()).is_none());
    }
}
