//! Persistence collaborators for listings and accounts.
//!
//! Stores are dumb: they evaluate the predicate they are handed and never
//! decide visibility themselves. Scope is always resolved by the caller and
//! folded into the filter before it reaches a store.

use thiserror::Error;

use rentdesk_auth::{Account, AccountFilter, AccountSortKey};
use rentdesk_core::{DomainError, ListingId, Sort, UserId, Window};
use rentdesk_listings::{Listing, ListingFilter, ListingSortKey};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::{PostgresAccountStore, PostgresListingStore, ensure_schema};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique field is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The record to overwrite does not exist.
    #[error("record not found")]
    Missing,

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => DomainError::conflict(msg),
            StoreError::Missing => DomainError::not_found(),
            StoreError::Backend(msg) => DomainError::internal(msg),
        }
    }
}

/// Listing persistence.
///
/// `find` with `sort = None` returns matches in storage order; `window = None`
/// returns every match.
#[async_trait::async_trait]
pub trait ListingStore: Send + Sync {
    async fn find(
        &self,
        filter: &ListingFilter,
        sort: Option<Sort<ListingSortKey>>,
        window: Option<Window>,
    ) -> Result<Vec<Listing>, StoreError>;

    async fn count(&self, filter: &ListingFilter) -> Result<u64, StoreError>;

    async fn insert(&self, listing: Listing) -> Result<Listing, StoreError>;

    /// Overwrite an existing listing (matched by id).
    async fn save(&self, listing: Listing) -> Result<Listing, StoreError>;

    /// Remove by id. Returns whether a record was removed.
    async fn remove(&self, id: ListingId) -> Result<bool, StoreError>;

    /// Remove every listing owned by `owner`. Returns the number removed.
    async fn remove_owned_by(&self, owner: UserId) -> Result<u64, StoreError>;

    /// First match of `filter`, if any.
    async fn find_one(&self, filter: &ListingFilter) -> Result<Option<Listing>, StoreError> {
        let window = Window { skip: 0, limit: 1 };
        Ok(self.find(filter, None, Some(window)).await?.into_iter().next())
    }
}

/// Account persistence. Emails are unique; `insert` and `save` report a
/// taken email as [`StoreError::Conflict`].
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    async fn find(
        &self,
        filter: &AccountFilter,
        sort: Option<Sort<AccountSortKey>>,
        window: Option<Window>,
    ) -> Result<Vec<Account>, StoreError>;

    async fn count(&self, filter: &AccountFilter) -> Result<u64, StoreError>;

    /// Every account whose id is in `ids`, in no particular order.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<Account>, StoreError>;

    /// Lookup by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn insert(&self, account: Account) -> Result<Account, StoreError>;

    async fn save(&self, account: Account) -> Result<Account, StoreError>;

    async fn remove(&self, id: UserId) -> Result<bool, StoreError>;

    async fn find_one(&self, filter: &AccountFilter) -> Result<Option<Account>, StoreError> {
        let window = Window { skip: 0, limit: 1 };
        Ok(self.find(filter, None, Some(window)).await?.into_iter().next())
    }
}
