use rentdesk_auth::ListingScope;
use rentdesk_core::{ListingId, UserId};

use crate::{Listing, ListingCriteria};

/// Store-level listing predicate: the caller's scope intersected with an
/// optional id and optional range criteria.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ListingFilter {
    pub id: Option<ListingId>,
    pub scope: ListingScope,
    pub criteria: Option<ListingCriteria>,
}

impl ListingFilter {
    pub fn scoped(scope: ListingScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Every listing owned by `owner`, regardless of caller.
    pub fn owned_by(owner: UserId) -> Self {
        Self::scoped(ListingScope::owned_by(owner))
    }

    pub fn with_id(mut self, id: ListingId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_criteria(mut self, criteria: ListingCriteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    /// Rentable restriction after folding the scope into the criteria.
    ///
    /// `None` means no restriction. A client scope asking for non-rentable
    /// listings yields `Some(true)` here and `false` from [`Self::is_empty`].
    pub fn effective_rentable(&self) -> Option<bool> {
        match (self.scope.rentable_only, self.criteria.and_then(|c| c.rentable)) {
            (true, _) => Some(true),
            (false, requested) => requested,
        }
    }

    /// True when no listing can possibly match.
    pub fn is_empty(&self) -> bool {
        self.scope.rentable_only && self.criteria.and_then(|c| c.rentable) == Some(false)
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        !self.is_empty()
            && self.id.is_none_or(|id| id == listing.id)
            && self.scope.permits(listing.realtor, listing.rentable)
            && self.criteria.is_none_or(|c| c.matches(listing))
    }
}
