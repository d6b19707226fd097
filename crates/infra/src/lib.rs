//! Infrastructure layer: stores, read/write services, auth flows.
//!
//! - `store`: persistence traits with in-memory and Postgres implementations
//! - `listing_engine`: scoped, paged reads
//! - `mutation_guard`: scoped writes
//! - `auth_service`: login and signup

pub mod auth_service;
pub mod listing_engine;
pub mod mutation_guard;
pub mod store;

mod integration_tests;

pub use auth_service::{AuthService, LoginRequest, Session};
pub use listing_engine::{ListingEngine, ListingOwner, ListingView, OwnerProfile, Page};
pub use mutation_guard::MutationGuard;
pub use store::{
    AccountStore, InMemoryStore, ListingStore, PostgresAccountStore, PostgresListingStore, StoreError,
    ensure_schema,
};
