//! Query normalizer for listing reads.
//!
//! Turns untrusted query-string parameters into a bounded [`ListingQuery`].
//! Checks run in a fixed order and stop at the first violation:
//! `order`, `orderBy`, pagination, rooms, price, floor size, rentable.
//! A `min` above its `max` is accepted and simply matches nothing.

use core::cmp::Ordering;

use serde::Deserialize;

use rentdesk_core::paging::{parse_integer, parse_number, present};
use rentdesk_core::{DomainError, DomainResult, PageRequest, Sort, SortKey};

use crate::listing::{Listing, MAX_AMOUNT, MAX_ROOMS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingSortKey {
    Created,
    Realtor,
    Rentable,
    Lng,
    Lat,
    PricePerMonth,
    FloorSize,
    Rooms,
    Location,
    Name,
    Description,
}

impl ListingSortKey {
    /// Storage column for this key.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Realtor => "realtor",
            Self::Rentable => "rentable",
            Self::Lng => "lng",
            Self::Lat => "lat",
            Self::PricePerMonth => "price_per_month",
            Self::FloorSize => "floor_size",
            Self::Rooms => "rooms",
            Self::Location => "location",
            Self::Name => "name",
            Self::Description => "description",
        }
    }

    /// Ascending comparison of two listings on this key.
    pub fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        match self {
            Self::Created => a.created.cmp(&b.created),
            Self::Realtor => a.realtor.as_uuid().cmp(b.realtor.as_uuid()),
            Self::Rentable => a.rentable.cmp(&b.rentable),
            Self::Lng => a.lng.total_cmp(&b.lng),
            Self::Lat => a.lat.total_cmp(&b.lat),
            Self::PricePerMonth => a.price_per_month.total_cmp(&b.price_per_month),
            Self::FloorSize => a.floor_size.total_cmp(&b.floor_size),
            Self::Rooms => a.rooms.cmp(&b.rooms),
            Self::Location => a.location.cmp(&b.location),
            Self::Name => a.name.cmp(&b.name),
            Self::Description => a.description.cmp(&b.description),
        }
    }
}

impl SortKey for ListingSortKey {
    fn from_param(raw: &str) -> Option<Self> {
        Some(match raw {
            "created" => Self::Created,
            "realtor" => Self::Realtor,
            "rentable" => Self::Rentable,
            "lng" => Self::Lng,
            "lat" => Self::Lat,
            "pricePerMonth" => Self::PricePerMonth,
            "floorSize" => Self::FloorSize,
            "rooms" => Self::Rooms,
            "location" => Self::Location,
            "name" => Self::Name,
            "description" => Self::Description,
            _ => return None,
        })
    }

    fn default_key() -> Self {
        Self::Created
    }
}

/// Raw query-string parameters of the listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub current_page: Option<String>,
    pub rows_count: Option<String>,
    pub order: Option<String>,
    pub order_by: Option<String>,
    pub rooms_min: Option<String>,
    pub rooms_max: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub floor_size_min: Option<String>,
    pub floor_size_max: Option<String>,
    pub rentable: Option<String>,
}

/// Inclusive range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd> Range<T> {
    pub fn contains(&self, v: &T) -> bool {
        *v >= self.min && *v <= self.max
    }
}

/// Range and flag filters shared by the paged list and the map view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListingCriteria {
    pub rooms: Range<i64>,
    pub price: Range<f64>,
    pub floor_size: Range<f64>,
    /// `Some(true)`: rentable only; `Some(false)`: non-rentable only.
    pub rentable: Option<bool>,
}

impl Default for ListingCriteria {
    fn default() -> Self {
        Self {
            rooms: Range { min: 1, max: i64::from(MAX_ROOMS) },
            price: Range { min: 1.0, max: MAX_AMOUNT },
            floor_size: Range { min: 1.0, max: MAX_AMOUNT },
            rentable: None,
        }
    }
}

impl ListingCriteria {
    /// Parse rooms, price, floor size and rentable, in that order.
    pub fn normalize(params: &ListingParams) -> DomainResult<Self> {
        let defaults = Self::default();

        let rooms_invalid = || DomainError::validation("rooms", "The number of rooms must be between 0 and 100");
        let room_bound = |raw: Option<&str>, default: i64| match present(raw) {
            None => Ok(default),
            Some(raw) => parse_integer(raw).ok_or_else(rooms_invalid),
        };
        let rooms = Range {
            min: room_bound(params.rooms_min.as_deref(), defaults.rooms.min)?,
            max: room_bound(params.rooms_max.as_deref(), defaults.rooms.max)?,
        };
        if rooms.min <= 0 || rooms.max > i64::from(MAX_ROOMS) {
            return Err(rooms_invalid());
        }

        let price = amount_range(
            "price",
            "The price number must be between 0 and 10000",
            params.price_min.as_deref(),
            params.price_max.as_deref(),
            defaults.price,
        )?;
        let floor_size = amount_range(
            "floorSize",
            "The floor size number must be between 0 and 10000",
            params.floor_size_min.as_deref(),
            params.floor_size_max.as_deref(),
            defaults.floor_size,
        )?;

        let rentable = match present(params.rentable.as_deref()) {
            None => None,
            Some("rentable" | "true") => Some(true),
            Some("unrentable" | "false") => Some(false),
            Some(_) => {
                return Err(DomainError::validation(
                    "rentable",
                    "Rentable param should be either rentable or unrentable",
                ));
            }
        };

        Ok(Self {
            rooms,
            price,
            floor_size,
            rentable,
        })
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.rooms.contains(&i64::from(listing.rooms))
            && self.price.contains(&listing.price_per_month)
            && self.floor_size.contains(&listing.floor_size)
            && self.rentable.is_none_or(|r| r == listing.rentable)
    }
}

fn amount_range(
    field: &'static str,
    message: &'static str,
    min: Option<&str>,
    max: Option<&str>,
    defaults: Range<f64>,
) -> DomainResult<Range<f64>> {
    let invalid = || DomainError::validation(field, message);
    let bound = |raw: Option<&str>, default: f64| match present(raw) {
        None => Ok(default),
        Some(raw) => parse_number(raw).ok_or_else(invalid),
    };
    let range = Range {
        min: bound(min, defaults.min)?,
        max: bound(max, defaults.max)?,
    };
    if range.min <= 0.0 || range.max > MAX_AMOUNT {
        return Err(invalid());
    }
    Ok(range)
}

/// Normalized paged listing query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListingQuery {
    pub page: PageRequest,
    pub sort: Sort<ListingSortKey>,
    pub criteria: ListingCriteria,
}

impl ListingQuery {
    pub fn normalize(params: &ListingParams) -> DomainResult<Self> {
        let sort = Sort::parse(params.order.as_deref(), params.order_by.as_deref())?;
        let page = PageRequest::parse(params.current_page.as_deref(), params.rows_count.as_deref())?;
        let criteria = ListingCriteria::normalize(params)?;
        Ok(Self { page, sort, criteria })
    }
}
