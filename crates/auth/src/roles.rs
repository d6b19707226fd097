use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use rentdesk_core::{DomainError, DomainResult};

/// Role identifier as carried by an identity token.
///
/// Roles are opaque strings at this layer: a token may carry any string, and
/// only [`Role::kind`] decides whether it names one of the recognized roles.
/// The scope resolver refuses every operation for unrecognized roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const CLIENT: Role = Role(Cow::Borrowed("client"));
    pub const REALTOR: Role = Role(Cow::Borrowed("realtor"));
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The recognized role this string names, if any.
    pub fn kind(&self) -> Option<RoleKind> {
        RoleKind::from_name(self.as_str())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RoleKind> for Role {
    fn from(value: RoleKind) -> Self {
        match value {
            RoleKind::Client => Role::CLIENT,
            RoleKind::Realtor => Role::REALTOR,
            RoleKind::Admin => Role::ADMIN,
        }
    }
}

/// The three recognized roles. Persisted accounts always carry one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    #[default]
    Client,
    Realtor,
    Admin,
}

impl RoleKind {
    pub const ALL: [RoleKind; 3] = [RoleKind::Client, RoleKind::Realtor, RoleKind::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Client => "client",
            RoleKind::Realtor => "realtor",
            RoleKind::Admin => "admin",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Parse a `role` payload field (trimmed, exact match).
    pub fn parse_field(raw: &str) -> DomainResult<Self> {
        Self::from_name(raw.trim()).ok_or_else(|| {
            DomainError::validation("role", "Role should be one of client, realtor, and admin")
        })
    }
}

impl core::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_role_maps_to_kind_only_when_recognized() {
        assert_eq!(Role::new("realtor").kind(), Some(RoleKind::Realtor));
        assert_eq!(Role::new("superuser").kind(), None);
        assert_eq!(Role::new("Admin").kind(), None);
    }

    #[test]
    fn role_field_parsing_trims_but_is_case_sensitive() {
        assert_eq!(RoleKind::parse_field(" admin ").unwrap(), RoleKind::Admin);
        assert!(RoleKind::parse_field("ADMIN").is_err());
    }

    #[test]
    fn serde_round_trips_lowercase() {
        let json = serde_json::to_string(&RoleKind::Realtor).unwrap();
        assert_eq!(json, "\"realtor\"");
        let role: Role = serde_json::from_str("\"client\"").unwrap();
        assert_eq!(role, Role::CLIENT);
    }
}
