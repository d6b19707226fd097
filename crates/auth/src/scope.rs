//! Scope resolution: which records an identity may see or touch.
//!
//! Every read and write consults this module. It turns `(identity, resource,
//! operation)` into a predicate that callers intersect with whatever else they
//! filter on. A single role × resource × operation table ([`rule`]) is the
//! only place role rules live.
//!
//! - No IO
//! - No panics
//! - Pure policy (the caller applies the predicate)

use serde::Serialize;
use thiserror::Error;

use rentdesk_core::{DomainError, UserId};

use crate::{Identity, Operation, Resource, RoleKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unrecognized role '{0}'")]
    UnknownRole(String),

    #[error("role '{role}' may not {operation} {resource} records")]
    Denied {
        role: RoleKind,
        resource: Resource,
        operation: Operation,
    },

    #[error("role '{0}' may not browse the realtor directory")]
    DirectoryDenied(RoleKind),
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::forbidden(value.to_string())
    }
}

/// Visibility predicate over listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ListingScope {
    /// Restrict to listings owned by this account.
    pub owner: Option<UserId>,
    /// Restrict to rentable listings.
    pub rentable_only: bool,
}

impl ListingScope {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            rentable_only: false,
        }
    }

    pub fn rentable() -> Self {
        Self {
            owner: None,
            rentable_only: true,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.owner.is_none() && !self.rentable_only
    }

    pub fn permits(&self, owner: UserId, rentable: bool) -> bool {
        self.owner.is_none_or(|o| o == owner) && (!self.rentable_only || rentable)
    }
}

/// Visibility predicate over accounts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AccountScope {
    /// Restrict to exactly this account.
    pub only: Option<UserId>,
    /// Hide this account.
    pub excluding: Option<UserId>,
    /// Restrict to accounts holding one of these roles.
    pub roles: Option<Vec<RoleKind>>,
}

impl AccountScope {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn only(id: UserId) -> Self {
        Self {
            only: Some(id),
            ..Self::default()
        }
    }

    pub fn excluding(id: UserId) -> Self {
        Self {
            excluding: Some(id),
            ..Self::default()
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = RoleKind>) -> Self {
        self.roles = Some(roles.into_iter().collect());
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.only.is_none() && self.excluding.is_none() && self.roles.is_none()
    }

    pub fn permits(&self, id: UserId, role: RoleKind) -> bool {
        self.only.is_none_or(|o| o == id)
            && self.excluding != Some(id)
            && self.roles.as_ref().is_none_or(|roles| roles.contains(&role))
    }
}

/// Outcome of the policy table, before it is bound to a concrete identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Unrestricted,
    OwnRecords,
    RentableOnly,
    /// Non-admin accounts other than the caller.
    ManagedAccounts,
    AllButSelf,
    Deny,
}

fn rule(role: RoleKind, resource: Resource, op: Operation) -> Rule {
    use Operation::*;
    use Resource::*;
    use RoleKind::*;

    match (role, resource, op) {
        (Admin, Listing, _) => Rule::Unrestricted,
        (Admin, Account, List) => Rule::ManagedAccounts,
        (Admin, Account, Create | Update) => Rule::Unrestricted,
        (Admin, Account, Delete) => Rule::AllButSelf,

        (Realtor, Listing, _) => Rule::OwnRecords,
        (Client, Listing, List) => Rule::RentableOnly,
        (Client, Listing, Create | Update | Delete) => Rule::Deny,

        (Realtor | Client, Account, List | Update) => Rule::OwnRecords,
        (Realtor | Client, Account, Create | Delete) => Rule::Deny,
    }
}

fn known_role(identity: &Identity) -> Result<RoleKind, AuthzError> {
    identity.role_kind().ok_or_else(|| {
        tracing::debug!(user_id = %identity.user_id, role = %identity.role, "unrecognized role refused");
        AuthzError::UnknownRole(identity.role.as_str().to_string())
    })
}

fn denied(role: RoleKind, resource: Resource, operation: Operation) -> AuthzError {
    tracing::debug!(%role, %resource, %operation, "operation denied by scope policy");
    AuthzError::Denied {
        role,
        resource,
        operation,
    }
}

/// Listing predicate for `operation` performed by `identity`.
pub fn listing_scope(identity: &Identity, operation: Operation) -> Result<ListingScope, AuthzError> {
    let role = known_role(identity)?;
    match rule(role, Resource::Listing, operation) {
        Rule::Unrestricted => Ok(ListingScope::unrestricted()),
        Rule::OwnRecords => Ok(ListingScope::owned_by(identity.user_id)),
        Rule::RentableOnly => Ok(ListingScope::rentable()),
        Rule::ManagedAccounts | Rule::AllButSelf | Rule::Deny => {
            Err(denied(role, Resource::Listing, operation))
        }
    }
}

/// Account predicate for `operation` performed by `identity`.
pub fn account_scope(identity: &Identity, operation: Operation) -> Result<AccountScope, AuthzError> {
    let role = known_role(identity)?;
    match rule(role, Resource::Account, operation) {
        Rule::Unrestricted => Ok(AccountScope::unrestricted()),
        Rule::OwnRecords => Ok(AccountScope::only(identity.user_id)),
        Rule::ManagedAccounts => Ok(AccountScope::excluding(identity.user_id)
            .with_roles([RoleKind::Client, RoleKind::Realtor])),
        Rule::AllButSelf => Ok(AccountScope::excluding(identity.user_id)),
        Rule::RentableOnly | Rule::Deny => Err(denied(role, Resource::Account, operation)),
    }
}

/// Accounts that may own listings (realtors and admins), as offered to
/// listing editors.
pub fn realtor_directory(identity: &Identity) -> Result<AccountScope, AuthzError> {
    match known_role(identity)? {
        RoleKind::Admin | RoleKind::Realtor => {
            Ok(AccountScope::unrestricted().with_roles([RoleKind::Realtor, RoleKind::Admin]))
        }
        RoleKind::Client => {
            tracing::debug!(user_id = %identity.user_id, "client refused realtor directory");
            Err(AuthzError::DirectoryDenied(RoleKind::Client))
        }
    }
}
