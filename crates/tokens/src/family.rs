//! Refresh-token families: one record per login session, rotated by
//! compare-and-swap on the current token id.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;
use uuid::Uuid;

use marketedge_auth::PrincipalId;
use marketedge_core::{FamilyId, TenantId};

/// State of one rotation lineage.
///
/// `current_jti` is the id of the only refresh token that may rotate next.
/// Presenting any other token of the family is treated as replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyRecord {
    pub family_id: FamilyId,
    pub tenant_id: TenantId,
    pub principal_id: PrincipalId,
    pub current_jti: Uuid,
    pub revoked: bool,
}

/// Outcome of a compare-and-swap rotation attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The presented token was current; the family now points at the new jti.
    Rotated,
    /// The presented token was already retired. The implementation has
    /// revoked the whole family before returning this.
    Replayed,
    /// The family was revoked earlier (logout or a previous replay).
    Revoked,
    /// No record for this family id.
    UnknownFamily,
}

#[derive(Debug, Error)]
pub enum FamilyStoreError {
    #[error("family already exists: {0}")]
    AlreadyExists(FamilyId),

    #[error("family store unavailable: {0}")]
    Unavailable(String),
}

/// Arena of rotation-family records.
///
/// Implementations must make `rotate` atomic with respect to concurrent calls
/// on the same family: of two racing rotations presenting the same jti,
/// exactly one observes `Rotated`. On a jti mismatch the implementation must
/// revoke the family before returning `Replayed` — a reused token means the
/// lineage can no longer be trusted.
pub trait FamilyStore: Send + Sync {
    fn create(&self, record: FamilyRecord) -> Result<(), FamilyStoreError>;

    /// Compare-and-swap `current_jti` from `expected` to `next`.
    fn rotate(
        &self,
        family_id: FamilyId,
        expected: Uuid,
        next: Uuid,
    ) -> Result<RotationOutcome, FamilyStoreError>;

    /// Mark a family revoked. Idempotent; unknown families are a no-op.
    fn revoke(&self, family_id: FamilyId) -> Result<(), FamilyStoreError>;

    fn get(&self, family_id: FamilyId) -> Result<Option<FamilyRecord>, FamilyStoreError>;
}

/// In-memory family arena.
///
/// Sufficient for a single-process deployment; the trait seam is where a
/// shared backend would plug in for horizontal scale.
#[derive(Debug, Default)]
pub struct InMemoryFamilyStore {
    families: RwLock<HashMap<FamilyId, FamilyRecord>>,
}

impl InMemoryFamilyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FamilyStore for InMemoryFamilyStore {
    fn create(&self, record: FamilyRecord) -> Result<(), FamilyStoreError> {
        let mut families = self
            .families
            .write()
            .map_err(|_| FamilyStoreError::Unavailable("lock poisoned".to_string()))?;

        if families.contains_key(&record.family_id) {
            return Err(FamilyStoreError::AlreadyExists(record.family_id));
        }

        families.insert(record.family_id, record);
        Ok(())
    }

    fn rotate(
        &self,
        family_id: FamilyId,
        expected: Uuid,
        next: Uuid,
    ) -> Result<RotationOutcome, FamilyStoreError> {
        let mut families = self
            .families
            .write()
            .map_err(|_| FamilyStoreError::Unavailable("lock poisoned".to_string()))?;

        let Some(record) = families.get_mut(&family_id) else {
            return Ok(RotationOutcome::UnknownFamily);
        };

        if record.revoked {
            return Ok(RotationOutcome::Revoked);
        }

        if record.current_jti != expected {
            // Replay: the lineage is compromised, kill it entirely.
            record.revoked = true;
            return Ok(RotationOutcome::Replayed);
        }

        record.current_jti = next;
        Ok(RotationOutcome::Rotated)
    }

    fn revoke(&self, family_id: FamilyId) -> Result<(), FamilyStoreError> {
        let mut families = self
            .families
            .write()
            .map_err(|_| FamilyStoreError::Unavailable("lock poisoned".to_string()))?;

        if let Some(record) = families.get_mut(&family_id) {
            record.revoked = true;
        }
        Ok(())
    }

    fn get(&self, family_id: FamilyId) -> Result<Option<FamilyRecord>, FamilyStoreError> {
        let families = self
            .families
            .read()
            .map_err(|_| FamilyStoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(families.get(&family_id).cloned())
    }
}
