//! Listing domain module.
//!
//! This crate contains the rules for apartment listings, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage): the record and its
//! field constraints, the query-parameter normalizer, and the store-level
//! filter that combines a caller's scope with the requested ranges.

pub mod filter;
pub mod listing;
pub mod query;

pub use filter::ListingFilter;
pub use listing::{Listing, ListingPatch, NewListing};
pub use query::{ListingCriteria, ListingParams, ListingQuery, ListingSortKey, Range};
