use serde::{Deserialize, Serialize};

use rentdesk_core::UserId;

use crate::{Role, RoleKind};

/// Authenticated identity of the caller.
///
/// Built from a verified token and treated as the only authorization context
/// for the rest of the request; it is never re-fetched from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

impl Identity {
    pub fn new(user_id: UserId, email: impl Into<String>, role: impl Into<Role>) -> Self {
        Self {
            user_id,
            email: email.into(),
            role: role.into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn role_kind(&self) -> Option<RoleKind> {
        self.role.kind()
    }
}
