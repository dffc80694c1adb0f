//! Request-scoped tenant context and the verifier-chain resolver.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use marketedge_core::TenantId;

use crate::{AuthError, Claims, Industry, Permission, PrincipalId, Role, TokenType, TokenVerifier};

/// Request-scoped projection of a validated access token.
///
/// Owned by the resolver for the lifetime of one request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    principal_id: PrincipalId,
    tenant_id: TenantId,
    role: Role,
    permissions: Vec<Permission>,
    industry: Industry,
}

impl TenantContext {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            principal_id: claims.sub,
            tenant_id: claims.tenant_id,
            role: claims.role.clone(),
            permissions: claims.permissions.clone(),
            industry: claims.industry.clone(),
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn industry(&self) -> &Industry {
        &self.industry
    }

    pub fn has_permission(&self, required: &Permission) -> bool {
        self.permissions
            .iter()
            .any(|p| p.is_wildcard() || p == required)
    }
}

/// Ordered-strategy token resolver.
///
/// Tries each [`TokenVerifier`] in turn and builds a [`TenantContext`] from
/// the first set of claims accepted. Verification failure is always a 401-class
/// error; entitlement checks (403) happen later in [`crate::authorize`].
pub struct PermissionResolver {
    verifiers: Vec<Arc<dyn TokenVerifier>>,
}

impl PermissionResolver {
    pub fn new(verifiers: Vec<Arc<dyn TokenVerifier>>) -> Self {
        Self { verifiers }
    }

    /// Resolve a presented token into a tenant context.
    ///
    /// An expired internal token fails the internal verifier *and* the
    /// upstream fallback (wrong format for it), so it can never sneak back in
    /// through the transition path.
    pub fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<TenantContext, AuthError> {
        for verifier in &self.verifiers {
            let Some(claims) = verifier.verify(token, now) else {
                continue;
            };

            if claims.token_type != TokenType::Access {
                return Err(AuthError::TokenInvalid(
                    "refresh token presented as request credential".to_string(),
                ));
            }

            tracing::debug!(
                verifier = verifier.name(),
                tenant_id = %claims.tenant_id,
                "token verified"
            );
            return Ok(TenantContext::from_claims(&claims));
        }

        Err(AuthError::TokenInvalid(
            "no verification strategy accepted the token".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Principal, validate_claims};
    use chrono::Duration;

    /// Verifier that accepts exactly one pre-agreed token string.
    struct StaticVerifier {
        name: &'static str,
        token: &'static str,
        claims: Claims,
    }

    impl TokenVerifier for StaticVerifier {
        fn name(&self) -> &'static str {
            self.name
        }

        fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<Claims> {
            if token != self.token {
                return None;
            }
            validate_claims(&self.claims, now, self.claims.token_type).ok()?;
            Some(self.claims.clone())
        }
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
    fn first_accepting_verifier_wins() {
        let principal = test_principal();
        let claims = Claims::access(&principal, Utc::now(), Duration::minutes(30));

        let internal = Arc::new(StaticVerifier {
            name: "internal",
            token: "tok-internal",
            claims: claims.clone(),
        });
        let upstream = Arc::new(StaticVerifier {
            name: "upstream",
            token: "tok-upstream",
            claims: claims.clone(),
        });

        let resolver = PermissionResolver::new(vec![internal, upstream]);

        let ctx = resolver.resolve("tok-internal", Utc::now()).unwrap();
        assert_eq!(ctx.tenant_id(), principal.tenant_id);

        // A token only the fallback knows still resolves.
        let ctx = resolver.resolve("tok-upstream", Utc::now()).unwrap();
        assert_eq!(ctx.principal_id(), principal.id);
    }

    #[test]
    fn unknown_token_is_rejected() {
        let principal = test_principal();
        let claims = Claims::access(&principal, Utc::now(), Duration::minutes(30));
        let resolver = PermissionResolver::new(vec![Arc::new(StaticVerifier {
            name: "internal",
            token: "tok",
            claims,
        })]);

        let err = resolver.resolve("garbage", Utc::now()).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    #[test]
    fn refresh_token_is_not_a_request_credential() {
        let principal = test_principal();
        let claims = Claims::refresh(
            &principal,
            marketedge_core::FamilyId::new(),
            Utc::now(),
            Duration::days(7),
        );
        let resolver = PermissionResolver::new(vec![Arc::new(StaticVerifier {
            name: "internal",
            token: "tok",
            claims,
        })]);

        let err = resolver.resolve("tok", Utc::now()).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    #[test]
    fn expired_token_never_resolves() {
        let principal = test_principal();
        let expired = Claims::access(
            &principal,
            Utc::now() - Duration::hours(2),
            Duration::minutes(30),
        );

        // Both strategies hold the same expired claims; neither may accept.
        let resolver = PermissionResolver::new(vec![
            Arc::new(StaticVerifier {
                name: "internal",
                token: "tok",
                claims: expired.clone(),
            }),
            Arc::new(StaticVerifier {
                name: "upstream",
                token: "tok",
                claims: expired,
            }),
        ]);

        let err = resolver.resolve("tok", Utc::now()).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    #[test]
    fn has_permission_honors_wildcard() {
        let mut principal = test_principal();
        principal.permissions = vec![Permission::new("*")];
        let claims = Claims::access(&principal, Utc::now(), Duration::minutes(30));
        let ctx = TenantContext::from_claims(&claims);

        assert!(ctx.has_permission(&Permission::new("pricing.read")));
    }
}
