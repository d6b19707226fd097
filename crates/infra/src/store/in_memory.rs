use core::cmp::Ordering;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rentdesk_auth::{Account, AccountFilter, AccountSortKey};
use rentdesk_core::{Entity, ListingId, Sort, UserId, Window};
use rentdesk_listings::{Listing, ListingFilter, ListingSortKey};

use super::{AccountStore, ListingStore, StoreError};

/// In-memory record store for tests/dev.
///
/// Records are kept in insertion order, which is the "storage order" used for
/// unsorted reads and for ties under a stable sort.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    inner: RwLock<Vec<T>>,
}

impl<T> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity + Clone> InMemoryStore<T> {
    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<T>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<T>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn select(
        &self,
        matches: impl Fn(&T) -> bool,
        order: Option<&dyn Fn(&T, &T) -> Ordering>,
        window: Option<Window>,
    ) -> Result<Vec<T>, StoreError> {
        let records = self.read()?;
        let mut hits: Vec<T> = records.iter().filter(|r| matches(r)).cloned().collect();
        if let Some(order) = order {
            hits.sort_by(|a, b| order(a, b));
        }
        Ok(match window {
            Some(window) => window.apply(hits),
            None => hits,
        })
    }

    fn tally(&self, matches: impl Fn(&T) -> bool) -> Result<u64, StoreError> {
        Ok(self.read()?.iter().filter(|r| matches(r)).count() as u64)
    }

    /// Append `record` unless its id exists or `clashes` holds for a stored record.
    fn push(&self, record: T, clashes: impl Fn(&T, &T) -> bool) -> Result<T, StoreError> {
        let mut records = self.write()?;
        if records.iter().any(|r| r.id() == record.id() || clashes(r, &record)) {
            return Err(StoreError::Conflict("record already exists".to_string()));
        }
        records.push(record.clone());
        Ok(record)
    }

    /// Overwrite the record with `record`'s id in place.
    fn replace(&self, record: T, clashes: impl Fn(&T, &T) -> bool) -> Result<T, StoreError> {
        let mut records = self.write()?;
        if records.iter().any(|r| r.id() != record.id() && clashes(r, &record)) {
            return Err(StoreError::Conflict("record already exists".to_string()));
        }
        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or(StoreError::Missing)?;
        *slot = record.clone();
        Ok(record)
    }

    fn remove_where(&self, doomed: impl Fn(&T) -> bool) -> Result<u64, StoreError> {
        let mut records = self.write()?;
        let before = records.len();
        records.retain(|r| !doomed(r));
        Ok((before - records.len()) as u64)
    }
}

fn never<T>(_: &T, _: &T) -> bool {
    false
}

fn same_email(a: &Account, b: &Account) -> bool {
    a.email == b.email
}

#[async_trait::async_trait]
impl ListingStore for InMemoryStore<Listing> {
    async fn find(
        &self,
        filter: &ListingFilter,
        sort: Option<Sort<ListingSortKey>>,
        window: Option<Window>,
    ) -> Result<Vec<Listing>, StoreError> {
        let order = sort.map(|s| move |a: &Listing, b: &Listing| s.direction.apply(s.key.compare(a, b)));
        self.select(
            |l| filter.matches(l),
            order.as_ref().map(|f| f as &dyn Fn(&Listing, &Listing) -> Ordering),
            window,
        )
    }

    async fn count(&self, filter: &ListingFilter) -> Result<u64, StoreError> {
        self.tally(|l| filter.matches(l))
    }

    async fn insert(&self, listing: Listing) -> Result<Listing, StoreError> {
        self.push(listing, never)
    }

    async fn save(&self, listing: Listing) -> Result<Listing, StoreError> {
        self.replace(listing, never)
    }

    async fn remove(&self, id: ListingId) -> Result<bool, StoreError> {
        Ok(self.remove_where(|l| l.id == id)? > 0)
    }

    async fn remove_owned_by(&self, owner: UserId) -> Result<u64, StoreError> {
        self.remove_where(|l| l.realtor == owner)
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryStore<Account> {
    async fn find(
        &self,
        filter: &AccountFilter,
        sort: Option<Sort<AccountSortKey>>,
        window: Option<Window>,
    ) -> Result<Vec<Account>, StoreError> {
        let order = sort.map(|s| move |a: &Account, b: &Account| s.direction.apply(s.key.compare(a, b)));
        self.select(
            |a| filter.matches(a),
            order.as_ref().map(|f| f as &dyn Fn(&Account, &Account) -> Ordering),
            window,
        )
    }

    async fn count(&self, filter: &AccountFilter) -> Result<u64, StoreError> {
        self.tally(|a| filter.matches(a))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<Account>, StoreError> {
        self.select(|a| ids.contains(&a.id), None, None)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.read()?.iter().find(|a| a.email == email).cloned())
    }

    async fn insert(&self, account: Account) -> Result<Account, StoreError> {
        self.push(account, same_email)
            .map_err(|_| StoreError::Conflict("Email is already taken".to_string()))
    }

    async fn save(&self, account: Account) -> Result<Account, StoreError> {
        self.replace(account, same_email).map_err(|e| match e {
            StoreError::Conflict(_) => StoreError::Conflict("Email is already taken".to_string()),
            other => other,
        })
    }

    async fn remove(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(self.remove_where(|a| a.id == id)? > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use rentdesk_auth::{AccountScope, NewAccount, Registration, RoleKind};
    use rentdesk_core::SortDirection;
    use rentdesk_listings::NewListing;

    use super::*;

    fn listing(owner: UserId, price: f64) -> Listing {
        Listing::create(
            NewListing {
                name: Some("Flat".to_string()),
                description: Some("Quiet".to_string()),
                location: Some("Lisbon".to_string()),
                floor_size: Some(40.0),
                price: Some(price),
                lat: Some(38.7),
                lng: Some(-9.1),
                rooms: Some(1.0),
                realtor: None,
                rentable: Some(true),
            },
            owner,
            Utc::now(),
        )
        .unwrap()
    }

    fn account(email: &str) -> Account {
        let validated = NewAccount {
            first_name: Some("Ana".to_string()),
            last_name: Some("Silva".to_string()),
            email: Some(email.to_string()),
            password: Some("Passw0rd!".to_string()),
            repassword: Some("Passw0rd!".to_string()),
            role: Some("realtor".to_string()),
        }
        .validate(Registration::ByAdmin)
        .unwrap();
        Account::register(validated, "hash".to_string(), Utc::now() - Duration::seconds(1))
    }

    #[tokio::test]
    async fn find_sorts_then_windows() {
        let store = InMemoryStore::<Listing>::new();
        let owner = UserId::new();
        for price in [300.0, 100.0, 200.0] {
            store.insert(listing(owner, price)).await.unwrap();
        }
        let sort = Sort {
            key: ListingSortKey::PricePerMonth,
            direction: SortDirection::Desc,
        };
        let page = store
            .find(&ListingFilter::default(), Some(sort), Some(Window { skip: 1, limit: 5 }))
            .await
            .unwrap();
        let prices: Vec<f64> = page.iter().map(|l| l.price_per_month).collect();
        assert_eq!(prices, vec![200.0, 100.0]);
        assert_eq!(store.count(&ListingFilter::default()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn unsorted_reads_keep_insertion_order() {
        let store = InMemoryStore::<Listing>::new();
        let owner = UserId::new();
        let first = store.insert(listing(owner, 500.0)).await.unwrap();
        store.insert(listing(owner, 50.0)).await.unwrap();
        let all = store.find(&ListingFilter::default(), None, None).await.unwrap();
        assert_eq!(all[0].id, first.id);
    }

    #[tokio::test]
    async fn save_requires_existing_record() {
        let store = InMemoryStore::<Listing>::new();
        let err = store.save(listing(UserId::new(), 10.0)).await.unwrap_err();
        assert_eq!(err, StoreError::Missing);
    }

    #[tokio::test]
    async fn remove_owned_by_only_touches_that_owner() {
        let store = InMemoryStore::<Listing>::new();
        let (a, b) = (UserId::new(), UserId::new());
        store.insert(listing(a, 10.0)).await.unwrap();
        store.insert(listing(a, 20.0)).await.unwrap();
        store.insert(listing(b, 30.0)).await.unwrap();
        assert_eq!(store.remove_owned_by(a).await.unwrap(), 2);
        assert_eq!(store.count(&ListingFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_emails_conflict_on_insert_and_save() {
        let store = InMemoryStore::<Account>::new();
        store.insert(account("one@example.com")).await.unwrap();
        let mut second = store.insert(account("two@example.com")).await.unwrap();

        let err = store.insert(account("one@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        second.email = "one@example.com".to_string();
        assert!(matches!(store.save(second).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn account_filter_applies_scope() {
        let store = InMemoryStore::<Account>::new();
        let me = store.insert(account("me@example.com")).await.unwrap();
        store.insert(account("other@example.com")).await.unwrap();

        let mine = store
            .find(&AccountFilter::scoped(AccountScope::only(me.id)), None, None)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].role, RoleKind::Realtor);
        assert!(store.find_by_email("other@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn find_by_ids_returns_only_requested_accounts() {
        let store = InMemoryStore::<Account>::new();
        let a = store.insert(account("a@example.com")).await.unwrap();
        store.insert(account("b@example.com")).await.unwrap();
        let c = store.insert(account("c@example.com")).await.unwrap();

        let found = store.find_by_ids(&[a.id, c.id, UserId::new()]).await.unwrap();
        let mut emails: Vec<&str> = found.iter().map(|x| x.email.as_str()).collect();
        emails.sort_unstable();
        assert_eq!(emails, vec!["a@example.com", "c@example.com"]);
        assert!(store.find_by_ids(&[]).await.unwrap().is_empty());
    }
}
