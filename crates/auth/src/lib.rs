//! `faishion-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod identity;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, AuthzError};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use identity::{Identity, IdentityKind};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
