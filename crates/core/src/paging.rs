//! Pagination and sort parameters shared by every list endpoint.
//!
//! List endpoints receive their parameters as loosely-typed query strings. The
//! helpers here turn those strings into bounded, typed values or reject them
//! with a [`DomainError::Validation`] naming the offending parameter group.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Upper bound on `rowsCount`.
pub const MAX_ROWS_PER_PAGE: u64 = 1000;

/// Page size used when `rowsCount` is absent.
pub const DEFAULT_ROWS_PER_PAGE: u64 = 5;

/// Treat absent, empty and whitespace-only parameters alike.
pub fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a finite number.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an integer written in any numeric spelling with a zero fraction
/// (`"2"`, `"2.0"`, `"2e0"`).
pub fn parse_integer(raw: &str) -> Option<i64> {
    let v = parse_number(raw)?;
    if v.fract() != 0.0 || v < i64::MIN as f64 || v > i64::MAX as f64 {
        return None;
    }
    Some(v as i64)
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse the `order` parameter (default `asc`).
    pub fn parse(raw: Option<&str>) -> DomainResult<Self> {
        match present(raw) {
            None | Some("asc") => Ok(Self::Asc),
            Some("desc") => Ok(Self::Desc),
            Some(_) => Err(DomainError::validation(
                "order",
                "Order param should be either asc or desc",
            )),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Orient an ascending comparison.
    pub fn apply(&self, ordering: core::cmp::Ordering) -> core::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// A sortable field drawn from a fixed allow-list.
///
/// Implementors are closed enums, so a parsed key can only ever name a known
/// field (never an arbitrary, caller-chosen one).
pub trait SortKey: Copy + core::fmt::Debug + Send + Sync {
    /// Map an `orderBy` parameter value to a key, or `None` if not allowed.
    fn from_param(raw: &str) -> Option<Self>;

    /// Key used when `orderBy` is absent.
    fn default_key() -> Self;
}

/// Validated sort key and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: SortKey> Sort<K> {
    /// Parse `order` then `orderBy`, short-circuiting on the first violation.
    pub fn parse(order: Option<&str>, order_by: Option<&str>) -> DomainResult<Self> {
        let direction = SortDirection::parse(order)?;
        let key = match present(order_by) {
            None => K::default_key(),
            Some(raw) => K::from_param(raw)
                .ok_or_else(|| DomainError::validation("orderBy", "OrderBy param is invalid"))?,
        };
        Ok(Self { key, direction })
    }
}

/// Validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub current_page: u64,
    pub rows_count: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            current_page: 0,
            rows_count: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Parse `currentPage` / `rowsCount` (defaults 0 and 5).
    pub fn parse(current_page: Option<&str>, rows_count: Option<&str>) -> DomainResult<Self> {
        let invalid = || {
            DomainError::validation(
                "pagination",
                "Current page and rows per page must be non-negative integers",
            )
        };
        let parse = |raw: Option<&str>, default: u64| -> DomainResult<u64> {
            match present(raw) {
                None => Ok(default),
                Some(raw) => {
                    let v = parse_integer(raw).ok_or_else(invalid)?;
                    u64::try_from(v).map_err(|_| invalid())
                }
            }
        };

        let current_page = parse(current_page, 0)?;
        let rows_count = parse(rows_count, DEFAULT_ROWS_PER_PAGE)?;
        if rows_count > MAX_ROWS_PER_PAGE {
            return Err(DomainError::validation(
                "pagination",
                format!("Rows per page must not exceed {MAX_ROWS_PER_PAGE}"),
            ));
        }

        Ok(Self {
            current_page,
            rows_count,
        })
    }

    /// Skip/limit window for this page.
    pub fn window(&self) -> Window {
        Window {
            skip: self.current_page.saturating_mul(self.rows_count),
            limit: self.rows_count,
        }
    }
}

/// Skip/limit window passed to stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: u64,
    pub limit: u64,
}

impl Window {
    /// Apply the window to an already-filtered, already-sorted sequence.
    pub fn apply<T>(self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(limit).collect()
    }
}
