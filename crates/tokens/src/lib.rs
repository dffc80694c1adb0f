//! `marketedge-tokens` — internal token issuance and rotation.
//!
//! Mints the access/refresh JWT pair (HS256, server-held secret), rotates
//! refresh tokens against a compare-and-swap family store for replay
//! detection, and provides the internal [`TokenVerifier`] strategy used first
//! in the resolver chain.
//!
//! [`TokenVerifier`]: marketedge_auth::TokenVerifier

pub mod family;
pub mod issuer;
pub mod verifier;

pub use family::{FamilyRecord, FamilyStore, FamilyStoreError, InMemoryFamilyStore, RotationOutcome};
pub use issuer::{TokenConfig, TokenIssuer, TokenPair};
pub use verifier::Hs256Verifier;
