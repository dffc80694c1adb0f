//! `marketedge-auth` — pure authentication/authorization boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP, storage, and crypto
//! libraries. Signature verification lives behind the [`TokenVerifier`]
//! strategy trait; implementations are provided by `marketedge-tokens`
//! (internal HS256) and `marketedge-identity` (upstream fallback).

pub mod authorize;
pub mod claims;
pub mod error;
pub mod industry;
pub mod permissions;
pub mod principal;
pub mod resolver;
pub mod roles;
pub mod verifier;

pub use authorize::{AuthzError, authorize};
pub use claims::{Claims, TokenType, TokenValidationError, validate_claims};
pub use error::AuthError;
pub use industry::Industry;
pub use permissions::{Permission, permissions_for_role};
pub use principal::{Principal, PrincipalId};
pub use resolver::{PermissionResolver, TenantContext};
pub use roles::Role;
pub use verifier::TokenVerifier;
