use chrono::{DateTime, Utc};

use crate::Claims;

/// One token-verification strategy.
///
/// The resolver holds an ordered list of these (internal HS256 first, then
/// the upstream provider's format for the migration window) and stops at the
/// first strategy that accepts the token. Returning `None` means "not mine /
/// not valid" — a verifier must never panic on garbage input.
pub trait TokenVerifier: Send + Sync {
    /// Strategy name, used in logs when a fallback path authenticates.
    fn name(&self) -> &'static str;

    /// Verify signature and temporal validity, returning the decoded claims.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<Claims>;
}
