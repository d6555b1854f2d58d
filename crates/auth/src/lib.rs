//! `roster-auth`: authentication/authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage: persistence is
//! reached through the [`UserStore`] port and time is always passed in.

pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod password;
pub mod permissions;
pub mod role_change;
pub mod roles;
pub mod store;
pub mod table;
pub mod token;
pub mod user;

pub use authorize::{Authorizer, AuthzError, Principal, Visibility};
pub use claims::{JwtClaims, TokenKind, TokenValidationError, validate_claims};
pub use credentials::{AccessGrant, CredentialError, CredentialService, IssuedCredentials};
pub use password::{CredentialHasher, HashError, HashingCost};
pub use permissions::{Permission, UnknownPermission};
pub use role_change::{RoleChange, change_role};
pub use roles::{Role, UnknownRole};
pub use store::{StoreError, UserStore};
pub use table::{RolePermissionTable, TableError};
pub use token::{Hs256Jwt, JwtValidator, TokenError, TokenLifetimes};
pub use user::{NewUser, ProfileUpdate, User, UserProfile};
