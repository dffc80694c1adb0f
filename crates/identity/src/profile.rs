//! Upstream profile and its mapping into a MarketEdge principal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marketedge_auth::{AuthError, Industry, Principal, PrincipalId, Role, permissions_for_role};
use marketedge_core::TenantId;

/// What the upstream provider tells us about a user.
///
/// `sub` and `email` come from the standard OIDC claims; `org_id` and
/// `industry` are the organization metadata MarketEdge attaches during
/// provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamProfile {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl UpstreamProfile {
    /// Map the upstream profile to a principal ready for token issuance.
    ///
    /// An account without an organization claim cannot be placed in any
    /// tenant and is rejected; MarketEdge has no tenant-less principals.
    pub fn to_principal(&self) -> Result<Principal, AuthError> {
        if self.sub.is_empty() {
            return Err(AuthError::InvalidGrant(
                "upstream profile has an empty subject".to_string(),
            ));
        }

        let org = self.org_id.as_deref().ok_or_else(|| {
            AuthError::InvalidGrant("upstream profile has no organization claim".to_string())
        })?;

        let role = Role::new("viewer");
        let permissions = permissions_for_role(&role);

        Ok(Principal {
            id: principal_id_for_subject(&self.sub),
            email: self.email.clone(),
            tenant_id: tenant_id_for_org(org),
            role,
            permissions,
            industry: self
                .industry
                .as_deref()
                .map(|i| Industry::new(i.to_string()))
                .unwrap_or_else(Industry::unspecified),
        })
    }
}

/// Stable principal id for an upstream subject.
///
/// Upstream subjects are provider-prefixed strings ("auth0|..."); hashing to
/// UUIDv5 keeps the id stable across logins without a user table.
pub fn principal_id_for_subject(sub: &str) -> PrincipalId {
    PrincipalId::from_uuid(Uuid::new_v5(&Uuid::NAMESPACE_URL, sub.as_bytes()))
}

/// Tenant id for an upstream organization claim.
///
/// Organizations provisioned by MarketEdge carry UUID ids; third-party org
/// ids are hashed deterministically so the same org always lands in the same
/// tenant.
pub fn tenant_id_for_org(org: &str) -> TenantId {
    match org.parse::<Uuid>() {
        Ok(uuid) => TenantId::from_uuid(uuid),
        Err(_) => TenantId::from_uuid(Uuid::new_v5(&Uuid::NAMESPACE_URL, org.as_bytes())),
    }
}
