use thiserror::Error;

use marketedge_core::TenantId;

use crate::{Permission, TenantContext};

/// Authorization failure (the caller is authenticated but not entitled).
///
/// Both variants map to HTTP 403 — never 401. The authenticated/entitled
/// distinction drives client behavior (re-login vs access-denied screen).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The request targets a resource owned by a different tenant.
    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a resolved context against a tenant-scoped resource.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
///
/// The tenant boundary is checked before permissions: a cross-tenant request
/// is rejected even if the permission set would otherwise allow the action.
pub fn authorize(
    context: &TenantContext,
    resource_tenant: TenantId,
    required: &Permission,
) -> Result<(), AuthzError> {
    if context.tenant_id() != resource_tenant {
        return Err(AuthzError::TenantMismatch);
    }

    if context.has_permission(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Claims, Industry, Principal, PrincipalId, Role};
    use chrono::{Duration, Utc};

    fn context_for(tenant_id: TenantId, permissions: Vec<Permission>) -> TenantContext {
        let principal = Principal {
            id: PrincipalId::new(),
            email: "a@b.com".to_string(),
            tenant_id,
            role: Role::new("analyst"),
            permissions,
            industry: Industry::unspecified(),
        };
        let claims = Claims::access(&principal, Utc::now(), Duration::minutes(30));
        TenantContext::from_claims(&claims)
    }

    #[test]
    fn same_tenant_with_permission_is_authorized() {
        let tenant = TenantId::new();
        let ctx = context_for(tenant, vec![Permission::new("reports.read")]);

        assert!(authorize(&ctx, tenant, &Permission::new("reports.read")).is_ok());
    }

    #[test]
    fn cross_tenant_is_rejected_even_with_wildcard() {
        let ctx = context_for(TenantId::new(), vec![Permission::new("*")]);

        let err = authorize(&ctx, TenantId::new(), &Permission::new("reports.read")).unwrap_err();
        assert_eq!(err, AuthzError::TenantMismatch);
    }

    #[test]
    fn missing_permission_is_forbidden() {
        let tenant = TenantId::new();
        let ctx = context_for(tenant, vec![Permission::new("reports.read")]);

        let err = authorize(&ctx, tenant, &Permission::new("pricing.write")).unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden(_)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;
        use uuid::Uuid;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: a token for tenant A never authorizes tenant B's
            /// resources, for any permission set.
            #[test]
            fn tenant_isolation_holds(
                tenant_a in prop::array::uniform16(any::<u8>()),
                tenant_b in prop::array::uniform16(any::<u8>()),
                wildcard in any::<bool>(),
            ) {
                let a = TenantId::from_uuid(Uuid::from_bytes(tenant_a));
                let b = TenantId::from_uuid(Uuid::from_bytes(tenant_b));
                prop_assume!(a != b);

                let perms = if wildcard {
                    vec![Permission::new("*")]
                } else {
                    vec![Permission::new("reports.read")]
                };
                let ctx = context_for(a, perms);

                prop_assert_eq!(
                    authorize(&ctx, b, &Permission::new("reports.read")),
                    Err(AuthzError::TenantMismatch)
                );
            }

            /// Property: within the same tenant, the wildcard grants any
            /// requested permission.
            #[test]
            fn wildcard_grants_all_within_tenant(name in "[a-z]{1,12}\\.[a-z]{1,12}") {
                let tenant = TenantId::new();
                let ctx = context_for(tenant, vec![Permission::new("*")]);

                prop_assert!(authorize(&ctx, tenant, &Permission::new(name)).is_ok());
            }
        }
    }
}
