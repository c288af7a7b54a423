//! `shopledger-auth` — authentication/authorization boundary for the shop API.
//!
//! This crate is intentionally decoupled from HTTP and storage: token codecs,
//! claims validation, and permission checks are all pure and synchronous.

pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{AuthzError, OperationAuthorization, Principal, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use permissions::Permission;
pub use principal::{PrincipalId, ShopMembership};
pub use roles::Role;
pub use token::{Hs256TokenCodec, TokenError};
pub use user::{NewUser, User, UserPatch, UserStatus};
