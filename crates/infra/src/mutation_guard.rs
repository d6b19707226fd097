//! Write paths: ownership and role checks for listings and accounts.
//!
//! Lookups for update/delete go through the caller's scope, so a record that
//! exists but is out of scope is reported exactly like a missing one
//! (`NotFound`). Validation runs before any write; nothing partially applies.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use rentdesk_auth::{
    Account, AccountFilter, AccountPatch, CredentialHasher, Identity, NewAccount, Operation,
    Registration, RoleKind, account_scope, listing_scope,
};
use rentdesk_core::{DomainError, DomainResult, ListingId, UserId};
use rentdesk_listings::{Listing, ListingFilter, ListingPatch, NewListing};

use crate::auth_service::hash_password;
use crate::store::{AccountStore, ListingStore};

#[derive(Clone)]
pub struct MutationGuard {
    listings: Arc<dyn ListingStore>,
    accounts: Arc<dyn AccountStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl MutationGuard {
    pub fn new(
        listings: Arc<dyn ListingStore>,
        accounts: Arc<dyn AccountStore>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            listings,
            accounts,
            hasher,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Listings
    // ─────────────────────────────────────────────────────────────────────

    /// Create a listing. A realtor always owns what they create; an admin
    /// must name the owner.
    #[instrument(skip_all, fields(user_id = %identity.user_id), err(Display))]
    pub async fn create_listing(&self, identity: &Identity, payload: NewListing) -> DomainResult<Listing> {
        let scope = listing_scope(identity, Operation::Create)?;
        let owner = match scope.owner {
            Some(me) => me,
            None => payload
                .requested_owner()?
                .ok_or_else(|| DomainError::validation("realtor", "Realtor is required"))?,
        };

        let listing = Listing::create(payload, owner, Utc::now())?;
        self.ensure_owner(owner).await?;

        let listing = self.listings.insert(listing).await?;
        tracing::info!(listing_id = %listing.id, realtor = %listing.realtor, "listing created");
        Ok(listing)
    }

    /// Apply present keys of `patch` to a listing in the caller's scope.
    ///
    /// Owner reassignment is honored only for an unrestricted (admin) scope and
    /// silently ignored otherwise.
    #[instrument(skip_all, fields(user_id = %identity.user_id, listing_id = %id), err(Display))]
    pub async fn update_listing(
        &self,
        identity: &Identity,
        id: ListingId,
        patch: ListingPatch,
    ) -> DomainResult<Listing> {
        let scope = listing_scope(identity, Operation::Update)?;
        let mut listing = self
            .listings
            .find_one(&ListingFilter::scoped(scope).with_id(id))
            .await?
            .ok_or_else(DomainError::not_found)?;

        if patch.is_empty() {
            return Ok(listing);
        }

        let new_owner = if scope.is_unrestricted() {
            patch.requested_owner()?
        } else {
            if patch.realtor.is_some() {
                tracing::debug!("owner reassignment ignored for restricted scope");
            }
            None
        };
        if let Some(owner) = new_owner {
            self.ensure_owner(owner).await?;
        }

        patch.apply(&mut listing, new_owner)?;
        Ok(self.listings.save(listing).await?)
    }

    #[instrument(skip_all, fields(user_id = %identity.user_id, listing_id = %id), err(Display))]
    pub async fn delete_listing(&self, identity: &Identity, id: ListingId) -> DomainResult<()> {
        let scope = listing_scope(identity, Operation::Delete)?;
        let listing = self
            .listings
            .find_one(&ListingFilter::scoped(scope).with_id(id))
            .await?
            .ok_or_else(DomainError::not_found)?;

        if !self.listings.remove(listing.id).await? {
            return Err(DomainError::not_found());
        }
        tracing::info!(listing_id = %id, "listing removed");
        Ok(())
    }

    /// The owner must be an existing realtor or admin.
    async fn ensure_owner(&self, owner: UserId) -> DomainResult<()> {
        let account = self
            .accounts
            .find_one(&AccountFilter::default().with_id(owner))
            .await?
            .ok_or_else(|| DomainError::validation("realtor", format!("{owner} is not a known realtor")))?;
        if account.role == RoleKind::Client {
            return Err(DomainError::validation("realtor", "A client can not own an apartment"));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accounts
    // ─────────────────────────────────────────────────────────────────────

    /// Admin-only account creation, any role.
    #[instrument(skip_all, fields(user_id = %identity.user_id), err(Display))]
    pub async fn create_account(&self, identity: &Identity, payload: NewAccount) -> DomainResult<Account> {
        account_scope(identity, Operation::Create)?;
        let validated = payload.validate(Registration::ByAdmin)?;
        if self.accounts.find_by_email(&validated.email).await?.is_some() {
            return Err(DomainError::conflict("Email is already taken"));
        }

        let password_hash = hash_password(self.hasher.clone(), validated.password.clone()).await?;
        let account = self
            .accounts
            .insert(Account::register(validated, password_hash, Utc::now()))
            .await?;
        tracing::info!(account_id = %account.id, role = %account.role, "account created");
        Ok(account)
    }

    /// Update an account in the caller's scope. Only an admin may change roles.
    #[instrument(skip_all, fields(user_id = %identity.user_id, account_id = %id), err(Display))]
    pub async fn update_account(
        &self,
        identity: &Identity,
        id: UserId,
        patch: AccountPatch,
    ) -> DomainResult<Account> {
        let scope = account_scope(identity, Operation::Update)?;
        let mut account = self
            .accounts
            .find_one(&AccountFilter::scoped(scope.clone()).with_id(id))
            .await?
            .ok_or_else(DomainError::not_found)?;

        let patch = patch.validate()?;
        if patch.is_empty() {
            return Ok(account);
        }
        if patch.role.is_some_and(|role| role != account.role) && !scope.is_unrestricted() {
            tracing::debug!(from = %account.role, "role change refused");
            return Err(DomainError::forbidden("Only an admin can change roles"));
        }
        if patch.role == Some(RoleKind::Client) && account.role != RoleKind::Client {
            let owned = self.listings.count(&ListingFilter::owned_by(id)).await?;
            if owned > 0 {
                tracing::debug!(owned, "demotion of listing owner refused");
                return Err(DomainError::validation(
                    "role",
                    "A realtor who owns apartments can not become a client",
                ));
            }
        }

        let password_hash = match &patch.password {
            Some(plaintext) => Some(hash_password(self.hasher.clone(), plaintext.clone()).await?),
            None => None,
        };
        account.apply(&patch, password_hash);
        Ok(self.accounts.save(account).await?)
    }

    /// Admin-only delete, never of the caller. Cascades to the account's listings.
    ///
    /// Account removal and the cascade are two store calls, not one transaction.
    #[instrument(skip_all, fields(user_id = %identity.user_id, account_id = %id), err(Display))]
    pub async fn delete_account(&self, identity: &Identity, id: UserId) -> DomainResult<()> {
        let scope = account_scope(identity, Operation::Delete)?;
        if scope.excluding == Some(id) {
            return Err(DomainError::forbidden("An admin can not delete their own account"));
        }

        if !self.accounts.remove(id).await? {
            return Err(DomainError::not_found());
        }
        let cascaded = self.listings.remove_owned_by(id).await?;
        tracing::info!(account_id = %id, cascaded, "account removed");
        Ok(())
    }
}
