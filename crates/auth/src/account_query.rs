//! Account directory queries: sort keys, raw parameters and filters.

use core::cmp::Ordering;

use serde::Deserialize;

use rentdesk_core::{DomainResult, PageRequest, Sort, SortKey, UserId};

use crate::{Account, AccountScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountSortKey {
    Created,
    FirstName,
    LastName,
    Email,
    Role,
}

impl AccountSortKey {
    /// Storage column for this key.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Role => "role",
        }
    }

    /// Ascending comparison of two accounts on this key.
    pub fn compare(&self, a: &Account, b: &Account) -> Ordering {
        match self {
            Self::Created => a.created.cmp(&b.created),
            Self::FirstName => a.first_name.cmp(&b.first_name),
            Self::LastName => a.last_name.cmp(&b.last_name),
            Self::Email => a.email.cmp(&b.email),
            Self::Role => a.role.as_str().cmp(b.role.as_str()),
        }
    }
}

impl SortKey for AccountSortKey {
    fn from_param(raw: &str) -> Option<Self> {
        match raw {
            "created" => Some(Self::Created),
            "firstName" => Some(Self::FirstName),
            "lastName" => Some(Self::LastName),
            "email" => Some(Self::Email),
            "role" => Some(Self::Role),
            _ => None,
        }
    }

    fn default_key() -> Self {
        Self::Created
    }
}

/// Raw query-string parameters of the account list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountParams {
    pub current_page: Option<String>,
    pub rows_count: Option<String>,
    pub order: Option<String>,
    pub order_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountQuery {
    pub page: PageRequest,
    pub sort: Sort<AccountSortKey>,
}

impl AccountQuery {
    pub fn normalize(params: &AccountParams) -> DomainResult<Self> {
        let sort = Sort::parse(params.order.as_deref(), params.order_by.as_deref())?;
        let page = PageRequest::parse(params.current_page.as_deref(), params.rows_count.as_deref())?;
        Ok(Self { page, sort })
    }
}

/// Store-level account predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub id: Option<UserId>,
    pub scope: AccountScope,
}

impl AccountFilter {
    pub fn scoped(scope: AccountScope) -> Self {
        Self { id: None, scope }
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn matches(&self, account: &Account) -> bool {
        self.id.is_none_or(|id| id == account.id) && self.scope.permits(account.id, account.role)
    }
}
