use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

use rentdesk_core::paging::{parse_number, present};
use rentdesk_core::{DomainError, DomainResult, Entity, ListingId, UserId};

/// Upper bound (inclusive) on floor size and monthly price.
pub const MAX_AMOUNT: f64 = 10_000.0;

pub const MIN_ROOMS: i32 = 1;
pub const MAX_ROOMS: i32 = 100;

/// Rental listing (an apartment).
///
/// # Invariants
/// - `name`, `description` and `location` are trimmed and non-empty.
/// - `1 <= rooms <= 100`.
/// - `0 < floor_size <= 10000` and `0 < price_per_month <= 10000`.
/// - `-90 < lat < 90` and `-180 < lng < 180`.
/// - `realtor` names exactly one owning account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub description: String,
    pub location: String,
    pub rooms: i32,
    pub floor_size: f64,
    pub price_per_month: f64,
    pub lat: f64,
    pub lng: f64,
    pub realtor: UserId,
    pub rentable: bool,
    pub created: DateTime<Utc>,
}

impl Entity for Listing {
    type Id = ListingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Listing {
    /// Build a new listing owned by `owner` from a create payload.
    ///
    /// Any `realtor` carried by the payload is ignored here; the caller decides
    /// the owner (see [`NewListing::requested_owner`]).
    pub fn create(payload: NewListing, owner: UserId, now: DateTime<Utc>) -> DomainResult<Self> {
        let listing = Self {
            id: ListingId::new(),
            name: text("name", "Name is required", payload.name)?,
            description: text("description", "Description is required", payload.description)?,
            location: text("location", "Location is required", payload.location)?,
            rooms: rooms(required("rooms", "Number of rooms must be specified", payload.rooms)?)?,
            floor_size: required("floor_size", "Floor Size must be specified", payload.floor_size)?,
            price_per_month: required("price", "Price per month must be specified", payload.price)?,
            lat: required("lat", "Latitude is required", payload.lat)?,
            lng: required("lng", "Longitude is required", payload.lng)?,
            realtor: owner,
            rentable: payload.rentable.unwrap_or(true),
            created: now,
        };
        listing.validate()?;
        Ok(listing)
    }

    /// Check every field constraint, in declaration order.
    pub fn validate(&self) -> DomainResult<()> {
        for (field, label, value) in [
            ("name", "Name", &self.name),
            ("description", "Description", &self.description),
            ("location", "Location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(field, format!("{label} is required")));
            }
        }
        if !(MIN_ROOMS..=MAX_ROOMS).contains(&self.rooms) {
            return Err(DomainError::validation(
                "rooms",
                format!("{} is not a valid number of rooms!", self.rooms),
            ));
        }
        if !amount_in_range(self.floor_size) {
            return Err(DomainError::validation(
                "floor_size",
                format!("{} is not a valid floor size!", self.floor_size),
            ));
        }
        if !amount_in_range(self.price_per_month) {
            return Err(DomainError::validation(
                "price",
                format!("{} is not a valid price!", self.price_per_month),
            ));
        }
        if !(self.lat > -90.0 && self.lat < 90.0) {
            return Err(DomainError::validation("lat", format!("{} is not a valid latitude!", self.lat)));
        }
        if !(self.lng > -180.0 && self.lng < 180.0) {
            return Err(DomainError::validation("lng", format!("{} is not a valid longitude!", self.lng)));
        }
        Ok(())
    }
}

fn amount_in_range(v: f64) -> bool {
    v > 0.0 && v <= MAX_AMOUNT
}

fn required<T>(field: &'static str, message: &'static str, raw: Option<T>) -> DomainResult<T> {
    raw.ok_or_else(|| DomainError::validation(field, message))
}

fn text(field: &'static str, message: &'static str, raw: Option<String>) -> DomainResult<String> {
    let value = raw.as_deref().map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(DomainError::validation(field, message));
    }
    Ok(value.to_string())
}

/// Round a room count to the nearest integer and bound-check it.
fn rooms(raw: f64) -> DomainResult<i32> {
    let rounded = raw.round();
    if !rounded.is_finite() || rounded < f64::from(MIN_ROOMS) || rounded > f64::from(MAX_ROOMS) {
        return Err(DomainError::validation(
            "rooms",
            format!("{raw} is not a valid number of rooms!"),
        ));
    }
    Ok(rounded as i32)
}

fn owner_id(raw: Option<&str>) -> DomainResult<Option<UserId>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| DomainError::validation("realtor", format!("{raw} is not a valid object ID!"))),
    }
}

/// Numeric payload field sent either as a JSON number or as a numeric string
/// (form posts). Blank strings count as absent.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(v)) => Ok(Some(v)),
        Some(Raw::Text(text)) => match present(Some(&text)) {
            None => Ok(None),
            Some(trimmed) => parse_number(trimmed)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("'{text}' is not a number"))),
        },
    }
}

/// Create payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewListing {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub floor_size: Option<f64>,
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub rooms: Option<f64>,
    pub realtor: Option<String>,
    pub rentable: Option<bool>,
}

impl NewListing {
    /// Owner named by the payload, if any.
    pub fn requested_owner(&self) -> DomainResult<Option<UserId>> {
        owner_id(self.realtor.as_deref())
    }
}

/// Partial update payload. Absent keys leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListingPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub floor_size: Option<f64>,
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub rooms: Option<f64>,
    pub realtor: Option<String>,
    pub rentable: Option<bool>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Owner named by the patch, if any.
    pub fn requested_owner(&self) -> DomainResult<Option<UserId>> {
        owner_id(self.realtor.as_deref())
    }

    /// Apply present keys to `listing`, then re-check every constraint.
    ///
    /// The owner changes only when `new_owner` is given; the patch's own
    /// `realtor` key is never applied directly.
    pub fn apply(&self, listing: &mut Listing, new_owner: Option<UserId>) -> DomainResult<()> {
        let mut next = listing.clone();
        if let Some(v) = &self.name {
            next.name = v.trim().to_string();
        }
        if let Some(v) = &self.description {
            next.description = v.trim().to_string();
        }
        if let Some(v) = &self.location {
            next.location = v.trim().to_string();
        }
        if let Some(v) = self.rooms {
            next.rooms = rooms(v)?;
        }
        if let Some(v) = self.floor_size {
            next.floor_size = v;
        }
        if let Some(v) = self.price {
            next.price_per_month = v;
        }
        if let Some(v) = self.lat {
            next.lat = v;
        }
        if let Some(v) = self.lng {
            next.lng = v;
        }
        if let Some(v) = self.rentable {
            next.rentable = v;
        }
        if let Some(owner) = new_owner {
            next.realtor = owner;
        }

        next.validate()?;
        *listing = next;
        Ok(())
    }
}
