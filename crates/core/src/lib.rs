//! `rentdesk-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error taxonomy shared by every layer, and the pagination /
//! sort parameter parsing used by list endpoints.

pub mod entity;
pub mod error;
pub mod id;
pub mod paging;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ListingId, UserId};
pub use paging::{PageRequest, Sort, SortDirection, SortKey, Window};
