use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Industry tag carried in token claims.
///
/// MarketEdge tailors dashboards per vertical (cinema, hotel, gym, retail);
/// the tag travels with the token so the frontend can select a default view
/// without an extra round trip. Opaque at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Industry(Cow<'static, str>);

impl Industry {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Fallback tag for accounts whose upstream profile carries no vertical.
    pub fn unspecified() -> Self {
        Self(Cow::Borrowed("general"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Industry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
