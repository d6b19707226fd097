//! Postgres-backed listing and account stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|-----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / Io / other | N/A | `Backend` |
//!
//! Optional predicates are expressed as `($n::type IS NULL OR column = $n)` so
//! every filter shape runs through one parameterized statement. Sort columns
//! come from closed enums and are the only interpolated SQL.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use tracing::instrument;

use rentdesk_auth::{Account, AccountFilter, AccountSortKey, RoleKind};
use rentdesk_core::{ListingId, Sort, UserId, Window};
use rentdesk_listings::{Listing, ListingFilter, ListingSortKey};

use super::{AccountStore, ListingStore, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id            UUID PRIMARY KEY,
        first_name    TEXT NOT NULL,
        last_name     TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL,
        created       TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS listings (
        id              UUID PRIMARY KEY,
        name            TEXT NOT NULL,
        description     TEXT NOT NULL,
        location        TEXT NOT NULL,
        rooms           INTEGER NOT NULL,
        floor_size      DOUBLE PRECISION NOT NULL,
        price_per_month DOUBLE PRECISION NOT NULL,
        lat             DOUBLE PRECISION NOT NULL,
        lng             DOUBLE PRECISION NOT NULL,
        realtor         UUID NOT NULL,
        rentable        BOOLEAN NOT NULL,
        created         TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS listings_realtor_idx ON listings (realtor)",
];

/// Create the tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn clamp(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn order_clause(column: &str, direction: rentdesk_core::SortDirection) -> String {
    format!("ORDER BY {} {}", column, direction.as_sql())
}

fn page_clause(window: Option<Window>) -> (&'static str, i64, i64) {
    match window {
        Some(w) => ("LIMIT $10 OFFSET $11", clamp(w.limit), clamp(w.skip)),
        None => ("", 0, 0),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Listings
// ─────────────────────────────────────────────────────────────────────────────

const LISTING_COLUMNS: &str =
    "id, name, description, location, rooms, floor_size, price_per_month, lat, lng, realtor, rentable, created";

const LISTING_WHERE: &str = r#"
    WHERE ($1::uuid IS NULL OR id = $1)
      AND ($2::uuid IS NULL OR realtor = $2)
      AND ($3::boolean IS NULL OR rentable = $3)
      AND ($4::bigint IS NULL OR rooms >= $4)
      AND ($5::bigint IS NULL OR rooms <= $5)
      AND ($6::float8 IS NULL OR price_per_month >= $6)
      AND ($7::float8 IS NULL OR price_per_month <= $7)
      AND ($8::float8 IS NULL OR floor_size >= $8)
      AND ($9::float8 IS NULL OR floor_size <= $9)
"#;

fn bind_listing_filter<'q>(
    query: Query<'q, Postgres, PgArguments>,
    filter: &ListingFilter,
) -> Query<'q, Postgres, PgArguments> {
    let criteria = filter.criteria;
    query
        .bind(filter.id.map(|id| *id.as_uuid()))
        .bind(filter.scope.owner.map(|id| *id.as_uuid()))
        .bind(filter.effective_rentable())
        .bind(criteria.map(|c| c.rooms.min))
        .bind(criteria.map(|c| c.rooms.max))
        .bind(criteria.map(|c| c.price.min))
        .bind(criteria.map(|c| c.price.max))
        .bind(criteria.map(|c| c.floor_size.min))
        .bind(criteria.map(|c| c.floor_size.max))
}

fn listing_from_row(row: &PgRow) -> anyhow::Result<Listing> {
    Ok(Listing {
        id: ListingId::from_uuid(row.try_get("id").context("listing id")?),
        name: row.try_get("name").context("listing name")?,
        description: row.try_get("description").context("listing description")?,
        location: row.try_get("location").context("listing location")?,
        rooms: row.try_get("rooms").context("listing rooms")?,
        floor_size: row.try_get("floor_size").context("listing floor_size")?,
        price_per_month: row.try_get("price_per_month").context("listing price_per_month")?,
        lat: row.try_get("lat").context("listing lat")?,
        lng: row.try_get("lng").context("listing lng")?,
        realtor: UserId::from_uuid(row.try_get("realtor").context("listing realtor")?),
        rentable: row.try_get("rentable").context("listing rentable")?,
        created: row.try_get("created").context("listing created")?,
    })
}

/// Postgres-backed listing store.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; no statement spans
/// more than one round trip.
#[derive(Debug, Clone)]
pub struct PostgresListingStore {
    pool: Arc<PgPool>,
}

impl PostgresListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait::async_trait]
impl ListingStore for PostgresListingStore {
    #[instrument(skip(self, filter), err)]
    async fn find(
        &self,
        filter: &ListingFilter,
        sort: Option<Sort<ListingSortKey>>,
        window: Option<Window>,
    ) -> Result<Vec<Listing>, StoreError> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        let order = sort
            .map(|s| order_clause(s.key.column(), s.direction))
            .unwrap_or_else(|| "ORDER BY created ASC".to_string());
        let (page, limit, offset) = page_clause(window);
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings {LISTING_WHERE} {order} {page}");

        let mut query = bind_listing_filter(sqlx::query(&sql), filter);
        if window.is_some() {
            query = query.bind(limit).bind(offset);
        }
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_listings", e))?;

        rows.iter()
            .map(|row| listing_from_row(row).map_err(|e| StoreError::Backend(format!("{e:#}"))))
            .collect()
    }

    async fn count(&self, filter: &ListingFilter) -> Result<u64, StoreError> {
        if filter.is_empty() {
            return Ok(0);
        }
        let sql = format!("SELECT COUNT(*) AS total FROM listings {LISTING_WHERE}");
        let row = bind_listing_filter(sqlx::query(&sql), filter)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_listings", e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| StoreError::Backend(format!("failed to read count: {e}")))?;
        Ok(total.max(0) as u64)
    }

    async fn insert(&self, listing: Listing) -> Result<Listing, StoreError> {
        sqlx::query(&format!(
            "INSERT INTO listings ({LISTING_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(listing.id.as_uuid())
        .bind(&listing.name)
        .bind(&listing.description)
        .bind(&listing.location)
        .bind(listing.rooms)
        .bind(listing.floor_size)
        .bind(listing.price_per_month)
        .bind(listing.lat)
        .bind(listing.lng)
        .bind(listing.realtor.as_uuid())
        .bind(listing.rentable)
        .bind(listing.created)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_listing", e))?;
        Ok(listing)
    }

    async fn save(&self, listing: Listing) -> Result<Listing, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE listings SET
                name = $2,
                description = $3,
                location = $4,
                rooms = $5,
                floor_size = $6,
                price_per_month = $7,
                lat = $8,
                lng = $9,
                realtor = $10,
                rentable = $11
            WHERE id = $1
            "#,
        )
        .bind(listing.id.as_uuid())
        .bind(&listing.name)
        .bind(&listing.description)
        .bind(&listing.location)
        .bind(listing.rooms)
        .bind(listing.floor_size)
        .bind(listing.price_per_month)
        .bind(listing.lat)
        .bind(listing.lng)
        .bind(listing.realtor.as_uuid())
        .bind(listing.rentable)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_listing", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing);
        }
        Ok(listing)
    }

    async fn remove(&self, id: ListingId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_listing", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_owned_by(&self, owner: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM listings WHERE realtor = $1")
            .bind(owner.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_owned_listings", e))?;
        Ok(result.rows_affected())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

const ACCOUNT_COLUMNS: &str = "id, first_name, last_name, email, password_hash, role, created";

const ACCOUNT_WHERE: &str = r#"
    WHERE ($1::uuid IS NULL OR id = $1)
      AND ($2::uuid IS NULL OR id = $2)
      AND ($3::uuid IS NULL OR id <> $3)
      AND ($4::text[] IS NULL OR role = ANY($4))
"#;

fn bind_account_filter<'q>(
    query: Query<'q, Postgres, PgArguments>,
    filter: &AccountFilter,
) -> Query<'q, Postgres, PgArguments> {
    let roles: Option<Vec<String>> = filter
        .scope
        .roles
        .as_ref()
        .map(|roles| roles.iter().map(|r| r.as_str().to_string()).collect());
    query
        .bind(filter.id.map(|id| *id.as_uuid()))
        .bind(filter.scope.only.map(|id| *id.as_uuid()))
        .bind(filter.scope.excluding.map(|id| *id.as_uuid()))
        .bind(roles)
}

fn account_from_row(row: &PgRow) -> anyhow::Result<Account> {
    let role: String = row.try_get("role").context("account role")?;
    Ok(Account {
        id: UserId::from_uuid(row.try_get("id").context("account id")?),
        first_name: row.try_get("first_name").context("account first_name")?,
        last_name: row.try_get("last_name").context("account last_name")?,
        email: row.try_get("email").context("account email")?,
        password_hash: row.try_get("password_hash").context("account password_hash")?,
        role: RoleKind::from_name(&role).with_context(|| format!("unknown stored role '{role}'"))?,
        created: row.try_get("created").context("account created")?,
    })
}

fn email_conflict(err: StoreError) -> StoreError {
    match err {
        StoreError::Conflict(_) => StoreError::Conflict("Email is already taken".to_string()),
        other => other,
    }
}

/// Postgres-backed account store. Email uniqueness is a table constraint.
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait::async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self, filter), err)]
    async fn find(
        &self,
        filter: &AccountFilter,
        sort: Option<Sort<AccountSortKey>>,
        window: Option<Window>,
    ) -> Result<Vec<Account>, StoreError> {
        let order = sort
            .map(|s| order_clause(s.key.column(), s.direction))
            .unwrap_or_else(|| "ORDER BY created ASC".to_string());
        let (page, limit, offset) = match window {
            Some(w) => ("LIMIT $5 OFFSET $6", clamp(w.limit), clamp(w.skip)),
            None => ("", 0, 0),
        };
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts {ACCOUNT_WHERE} {order} {page}");

        let mut query = bind_account_filter(sqlx::query(&sql), filter);
        if window.is_some() {
            query = query.bind(limit).bind(offset);
        }
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_accounts", e))?;

        rows.iter()
            .map(|row| account_from_row(row).map_err(|e| StoreError::Backend(format!("{e:#}"))))
            .collect()
    }

    async fn count(&self, filter: &AccountFilter) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) AS total FROM accounts {ACCOUNT_WHERE}");
        let row = bind_account_filter(sqlx::query(&sql), filter)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_accounts", e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| StoreError::Backend(format!("failed to read count: {e}")))?;
        Ok(total.max(0) as u64)
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<Account>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<_> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ANY($1::uuid[])"))
            .bind(ids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_accounts_by_ids", e))?;
        rows.iter()
            .map(|row| account_from_row(row).map_err(|e| StoreError::Backend(format!("{e:#}"))))
            .collect()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_account_by_email", e))?;
        row.as_ref()
            .map(account_from_row)
            .transpose()
            .map_err(|e| StoreError::Backend(format!("{e:#}")))
    }

    async fn insert(&self, account: Account) -> Result<Account, StoreError> {
        sqlx::query(&format!(
            "INSERT INTO accounts ({ACCOUNT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(account.id.as_uuid())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.created)
        .execute(&*self.pool)
        .await
        .map_err(|e| email_conflict(map_sqlx_error("insert_account", e)))?;
        Ok(account)
    }

    async fn save(&self, account: Account) -> Result<Account, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                first_name = $2,
                last_name = $3,
                email = $4,
                password_hash = $5,
                role = $6
            WHERE id = $1
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| email_conflict(map_sqlx_error("save_account", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing);
        }
        Ok(account)
    }

    async fn remove(&self, id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_account", e))?;
        Ok(result.rows_affected() > 0)
    }
}
