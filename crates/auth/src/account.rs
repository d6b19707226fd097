//! Account record and payload validation.
//!
//! # Invariants
//! - Emails are unique (enforced by the store at write time), trimmed and
//!   lower-cased.
//! - Roles are one of the three recognized roles.
//! - Self-signup never creates an admin.
//! - The password hash never leaves the process (not serialized, not logged).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rentdesk_core::{DomainError, DomainResult, Entity, UserId};

use crate::credentials::{normalize_email, validate_new_password};
use crate::{Identity, RoleKind};

// ─────────────────────────────────────────────────────────────────────────────
// Account
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: RoleKind,
    pub created: DateTime<Utc>,
}

impl Account {
    /// Build a new account from a validated payload and an already-hashed password.
    pub fn register(validated: ValidatedAccount, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            first_name: validated.first_name,
            last_name: validated.last_name,
            email: validated.email,
            password_hash,
            role: validated.role,
            created: now,
        }
    }

    /// Apply a validated partial update. Only present fields change.
    pub fn apply(&mut self, patch: &ValidatedAccountPatch, password_hash: Option<String>) {
        if let Some(v) = &patch.first_name {
            self.first_name = v.clone();
        }
        if let Some(v) = &patch.last_name {
            self.last_name = v.clone();
        }
        if let Some(v) = &patch.email {
            self.email = v.clone();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(hash) = password_hash {
            self.password_hash = hash;
        }
    }

    /// Identity this account authenticates as.
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.email.clone(), self.role)
            .with_name(self.first_name.clone(), self.last_name.clone())
    }
}

impl Entity for Account {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Debug for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

fn required(field: &'static str, label: &str, raw: Option<String>) -> DomainResult<String> {
    let value = raw.as_deref().map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(DomainError::validation(field, format!("{label} is required")));
    }
    Ok(value.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Create payload
// ─────────────────────────────────────────────────────────────────────────────

/// Signup / admin-create payload. Every field is optional at the wire level so
/// missing fields are reported as validation errors naming the field.
#[derive(Clone, Default, Deserialize)]
pub struct NewAccount {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub repassword: Option<String>,
    pub role: Option<String>,
}

/// Origin of an account creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Public signup: the admin role is refused.
    SelfSignup,
    /// Created by an admin: any role.
    ByAdmin,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: RoleKind,
}

impl NewAccount {
    pub fn validate(self, registration: Registration) -> DomainResult<ValidatedAccount> {
        let role = match self.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            None => RoleKind::Client,
            Some(raw) => RoleKind::parse_field(raw)?,
        };
        if role == RoleKind::Admin && registration == Registration::SelfSignup {
            return Err(DomainError::validation("role", "We can not sign up with admin role"));
        }

        let password = self.password.unwrap_or_default();
        let repassword = self.repassword.unwrap_or_default();
        if password != repassword {
            return Err(DomainError::validation("repassword", "Passwords do not match"));
        }

        let first_name = required("first_name", "First Name", self.first_name)?;
        let last_name = required("last_name", "Last Name", self.last_name)?;
        let email = normalize_email(self.email.as_deref().unwrap_or_default())?;
        validate_new_password(&password, &repassword)?;

        Ok(ValidatedAccount {
            first_name,
            last_name,
            email,
            password,
            role,
        })
    }
}

impl core::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl core::fmt::Debug for ValidatedAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValidatedAccount")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Update payload
// ─────────────────────────────────────────────────────────────────────────────

/// Partial account update. Absent keys leave the stored value untouched.
#[derive(Clone, Default, Deserialize)]
pub struct AccountPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub repassword: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct ValidatedAccountPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<RoleKind>,
    /// New plaintext password; hashed by the caller.
    pub password: Option<String>,
}

impl AccountPatch {
    pub fn validate(self) -> DomainResult<ValidatedAccountPatch> {
        let first_name = self
            .first_name
            .map(|v| required("first_name", "First Name", Some(v)))
            .transpose()?;
        let last_name = self
            .last_name
            .map(|v| required("last_name", "Last Name", Some(v)))
            .transpose()?;
        let email = self.email.as_deref().map(normalize_email).transpose()?;
        let role = self.role.as_deref().map(RoleKind::parse_field).transpose()?;

        let password = match (self.password, self.repassword) {
            (None, None) => None,
            (password, repassword) => {
                let password = password.unwrap_or_default();
                validate_new_password(&password, &repassword.unwrap_or_default())?;
                Some(password)
            }
        };

        Ok(ValidatedAccountPatch {
            first_name,
            last_name,
            email,
            role,
            password,
        })
    }
}

impl ValidatedAccountPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl core::fmt::Debug for AccountPatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccountPatch")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password_change", &self.password.is_some())
            .finish_non_exhaustive()
    }
}

impl core::fmt::Debug for ValidatedAccountPatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValidatedAccountPatch")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password_change", &self.password.is_some())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
