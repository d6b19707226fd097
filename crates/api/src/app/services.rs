//! Service wiring: stores, hasher and token issuer behind the read/write services.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use rentdesk_auth::{Account, Argon2Hasher, CredentialHasher, Hs256Jwt};
use rentdesk_infra::{
    AccountStore, AuthService, InMemoryStore, ListingEngine, ListingStore, MutationGuard,
    PostgresAccountStore, PostgresListingStore, ensure_schema,
};
use rentdesk_listings::Listing;

use crate::config::AppConfig;

const MAX_DB_CONNECTIONS: u32 = 10;

#[derive(Clone)]
pub struct AppServices {
    pub engine: ListingEngine,
    pub guard: MutationGuard,
    pub auth: AuthService,
}

impl AppServices {
    pub fn new(
        listings: Arc<dyn ListingStore>,
        accounts: Arc<dyn AccountStore>,
        hasher: Arc<dyn CredentialHasher>,
        jwt: Arc<Hs256Jwt>,
    ) -> Self {
        Self {
            engine: ListingEngine::new(listings.clone(), accounts.clone()),
            guard: MutationGuard::new(listings, accounts.clone(), hasher.clone()),
            auth: AuthService::new(accounts, hasher, jwt),
        }
    }
}

/// Build services for `config`: Postgres stores when a database URL is
/// configured, in-memory stores otherwise.
pub async fn build_services(config: &AppConfig, jwt: Arc<Hs256Jwt>) -> anyhow::Result<AppServices> {
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new());

    let (listings, accounts): (Arc<dyn ListingStore>, Arc<dyn AccountStore>) = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(MAX_DB_CONNECTIONS)
                .connect(url)
                .await
                .context("failed to connect to Postgres")?;
            ensure_schema(&pool).await.context("failed to prepare schema")?;
            tracing::info!("using Postgres stores");
            (
                Arc::new(PostgresListingStore::new(pool.clone())) as Arc<dyn ListingStore>,
                Arc::new(PostgresAccountStore::new(pool)) as Arc<dyn AccountStore>,
            )
        }
        None => {
            tracing::info!("using in-memory stores");
            (
                Arc::new(InMemoryStore::<Listing>::new()) as Arc<dyn ListingStore>,
                Arc::new(InMemoryStore::<Account>::new()) as Arc<dyn AccountStore>,
            )
        }
    };

    let services = AppServices::new(listings, accounts, hasher, jwt);
    if let Some(seed) = &config.admin {
        services
            .auth
            .ensure_admin(&seed.email, &seed.password)
            .await
            .context("failed to create the bootstrap admin")?;
    }
    Ok(services)
}
