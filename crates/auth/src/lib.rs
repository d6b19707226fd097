//! `rentdesk-auth` — authentication and authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it validates
//! credentials, mints and verifies identity tokens, and decides which records an
//! identity may see or touch. Callers consult [`scope`] for every operation
//! instead of re-deriving role rules locally.

pub mod account;
pub mod account_query;
pub mod claims;
pub mod credentials;
pub mod operation;
pub mod password;
pub mod principal;
pub mod roles;
pub mod scope;
pub mod token;

pub use account::{Account, AccountPatch, NewAccount, Registration, ValidatedAccount, ValidatedAccountPatch};
pub use account_query::{AccountFilter, AccountParams, AccountQuery, AccountSortKey};
pub use claims::{IdentityClaims, TokenValidationError, validate_claims};
pub use operation::{Operation, Resource};
pub use password::{Argon2Hasher, CredentialError, CredentialHasher};
pub use principal::Identity;
pub use roles::{Role, RoleKind};
pub use scope::{AccountScope, AuthzError, ListingScope, account_scope, listing_scope, realtor_directory};
pub use token::{Hs256Jwt, JwtIssuer, JwtValidator, TokenConfig, TokenError};
