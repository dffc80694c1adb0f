use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "reports.read").
/// A special wildcard permission `"*"` can be used by policy layers to indicate
/// "allow all" without hardcoding domain permissions into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role→permission mapping used when minting tokens.
///
/// Intentionally simple until a policy store exists. "admin" grants the
/// wildcard; other roles get an explicit grant list.
pub fn permissions_for_role(role: &Role) -> Vec<Permission> {
    match role.as_str() {
        "admin" => vec![Permission::new("*")],
        "analyst" => vec![
            Permission::new("reports.read"),
            Permission::new("reports.export"),
            Permission::new("pricing.read"),
        ],
        "viewer" => vec![Permission::new("reports.read")],
        _ => Vec::new(),
    }
}
