use std::str::FromStr;

use serde::Serialize;

use rentdesk_auth::{Account, Identity};
use rentdesk_core::DomainError;
use rentdesk_infra::{ListingView, Page};

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPageResponse {
    pub apartments: Vec<ListingView>,
    pub total_count: u64,
}

impl From<Page<ListingView>> for ListingPageResponse {
    fn from(page: Page<ListingView>) -> Self {
        Self {
            apartments: page.records,
            total_count: page.total_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPageResponse {
    pub users: Vec<Account>,
    pub total_count: u64,
}

impl From<Page<Account>> for AccountPageResponse {
    fn from(page: Page<Account>) -> Self {
        Self {
            users: page.records,
            total_count: page.total_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RealtorsResponse {
    pub users: Vec<Account>,
}

#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl From<&Identity> for WhoamiResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user_id.to_string(),
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            role: identity.role.as_str().to_string(),
        }
    }
}

// -------------------------
// Helpers
// -------------------------

/// Parse a path segment into a typed id (`Validation` on failure).
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(crate::app::errors::domain_error_to_response)
}
