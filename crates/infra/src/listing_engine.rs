//! Read paths: normalized, scoped, sorted and paginated queries.
//!
//! Every read goes normalizer → scope resolver → store. Records and total
//! count come from two separate store calls, so under concurrent writes the
//! count may disagree with the page by the writes in between.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use serde::Serialize;
use tracing::instrument;

use rentdesk_auth::{
    Account, AccountFilter, AccountParams, AccountQuery, AccountSortKey, Identity, Operation,
    RoleKind, account_scope, listing_scope, realtor_directory,
};
use rentdesk_core::{DomainError, DomainResult, ListingId, Sort, SortDirection, UserId};
use rentdesk_listings::{Listing, ListingCriteria, ListingFilter, ListingParams, ListingQuery};

use crate::store::{AccountStore, ListingStore};

/// One page of matches plus the number of matches across all pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total_count: u64,
}

/// Public fields of a listing's owner. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: RoleKind,
}

/// Owner reference embedded in listing reads. The profile is absent when the
/// owning account could not be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingOwner {
    pub id: UserId,
    #[serde(flatten)]
    pub profile: Option<OwnerProfile>,
}

/// A listing as returned by reads, with its owner resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    pub id: ListingId,
    pub name: String,
    pub description: String,
    pub location: String,
    pub rooms: i32,
    pub floor_size: f64,
    pub price_per_month: f64,
    pub lat: f64,
    pub lng: f64,
    pub realtor: ListingOwner,
    pub rentable: bool,
    pub created: DateTime<Utc>,
}

impl ListingView {
    pub fn new(listing: Listing, owner: Option<&Account>) -> Self {
        let profile = owner.map(|account| OwnerProfile {
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            email: account.email.clone(),
            role: account.role,
        });
        Self {
            id: listing.id,
            name: listing.name,
            description: listing.description,
            location: listing.location,
            rooms: listing.rooms,
            floor_size: listing.floor_size,
            price_per_month: listing.price_per_month,
            lat: listing.lat,
            lng: listing.lng,
            realtor: ListingOwner {
                id: listing.realtor,
                profile,
            },
            rentable: listing.rentable,
            created: listing.created,
        }
    }
}

#[derive(Clone)]
pub struct ListingEngine {
    listings: Arc<dyn ListingStore>,
    accounts: Arc<dyn AccountStore>,
}

impl ListingEngine {
    pub fn new(listings: Arc<dyn ListingStore>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { listings, accounts }
    }

    /// Paged listing query within the caller's visible set.
    #[instrument(skip_all, fields(user_id = %identity.user_id), err(Display))]
    pub async fn list(&self, identity: &Identity, params: &ListingParams) -> DomainResult<Page<ListingView>> {
        let query = ListingQuery::normalize(params)?;
        let scope = listing_scope(identity, Operation::List)?;
        let filter = ListingFilter::scoped(scope).with_criteria(query.criteria);

        let records = self
            .listings
            .find(&filter, Some(query.sort), Some(query.page.window()))
            .await?;
        let total_count = self.listings.count(&filter).await?;
        tracing::debug!(returned = records.len(), total_count, "listings listed");
        let records = self.with_owners(records).await?;
        Ok(Page { records, total_count })
    }

    /// Every visible match of the range filters, unpaginated (map view).
    #[instrument(skip_all, fields(user_id = %identity.user_id), err(Display))]
    pub async fn list_all(&self, identity: &Identity, params: &ListingParams) -> DomainResult<Page<ListingView>> {
        let criteria = ListingCriteria::normalize(params)?;
        let scope = listing_scope(identity, Operation::List)?;
        let filter = ListingFilter::scoped(scope).with_criteria(criteria);

        let records = self.listings.find(&filter, None, None).await?;
        let total_count = self.listings.count(&filter).await?;
        let records = self.with_owners(records).await?;
        Ok(Page { records, total_count })
    }

    /// Paged account directory within the caller's visible set.
    #[instrument(skip_all, fields(user_id = %identity.user_id), err(Display))]
    pub async fn list_accounts(&self, identity: &Identity, params: &AccountParams) -> DomainResult<Page<Account>> {
        let query = AccountQuery::normalize(params)?;
        let scope = account_scope(identity, Operation::List)?;
        let filter = AccountFilter::scoped(scope);

        let records = self
            .accounts
            .find(&filter, Some(query.sort), Some(query.page.window()))
            .await?;
        let total_count = self.accounts.count(&filter).await?;
        Ok(Page { records, total_count })
    }

    /// Accounts that may own listings.
    #[instrument(skip_all, fields(user_id = %identity.user_id), err(Display))]
    pub async fn realtors(&self, identity: &Identity) -> DomainResult<Vec<Account>> {
        let filter = AccountFilter::scoped(realtor_directory(identity)?);
        let sort = Sort {
            key: AccountSortKey::FirstName,
            direction: SortDirection::Asc,
        };
        Ok(self.accounts.find(&filter, Some(sort), None).await?)
    }

    /// Resolve the owners of `records` with one account lookup.
    async fn with_owners(&self, records: Vec<Listing>) -> DomainResult<Vec<ListingView>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<UserId> = records
            .iter()
            .map(|l| l.realtor)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let owners: HashMap<UserId, Account> = self
            .accounts
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();
        if owners.len() < ids.len() {
            tracing::warn!(missing = ids.len() - owners.len(), "listing owners not found");
        }

        Ok(records
            .into_iter()
            .map(|listing| {
                let owner = owners.get(&listing.realtor);
                ListingView::new(listing, owner)
            })
            .collect())
    }

    /// Single account read (profile page). Visible to whoever may edit it.
    pub async fn account(&self, identity: &Identity, id: UserId) -> DomainResult<Account> {
        let scope = account_scope(identity, Operation::Update)?;
        self.accounts
            .find_one(&AccountFilter::scoped(scope).with_id(id))
            .await?
            .ok_or_else(DomainError::not_found)
    }
}
