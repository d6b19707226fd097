use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rentdesk_core::UserId;

use crate::{Identity, Role};

/// JWT claims model (transport-agnostic).
///
/// Timestamps serialize as Unix seconds so the standard `iat`/`exp` claims are
/// readable by any JWT tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject / account identifier.
    pub sub: UserId,

    pub email: String,

    /// Role string; may be unrecognized, in which case every operation is refused.
    pub role: Role,

    pub first_name: String,

    pub last_name: String,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

impl IdentityClaims {
    pub fn new(identity: &Identity, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: identity.user_id,
            email: identity.email.clone(),
            role: identity.role.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            iat: issued_at,
            exp: issued_at + ttl,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.sub, self.email.clone(), self.role.clone())
            .with_name(self.first_name.clone(), self.last_name.clone())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claim time window against `now`.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// lives in [`crate::token`].
pub fn validate_claims(claims: &IdentityClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn claims_at(iat: DateTime<Utc>, ttl: Duration) -> IdentityClaims {
        let identity = Identity::new(UserId::new(), "ann@example.com", Role::REALTOR).with_name("Ann", "Lee");
        IdentityClaims::new(&identity, iat, ttl)
    }

    #[test]
    fn valid_inside_window() {
        let iat = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = claims_at(iat, Duration::hours(1));
        assert_eq!(validate_claims(&claims, iat + Duration::minutes(30)), Ok(()));
    }

    #[test]
    fn expiry_is_exclusive() {
        let iat = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = claims_at(iat, Duration::hours(1));
        assert_eq!(
            validate_claims(&claims, iat + Duration::hours(1)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn future_issue_and_empty_window_rejected() {
        let iat = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = claims_at(iat, Duration::hours(1));
        assert_eq!(
            validate_claims(&claims, iat - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );

        let empty = claims_at(iat, Duration::zero());
        assert_eq!(validate_claims(&empty, iat), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn timestamps_serialize_as_seconds() {
        let iat = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(claims_at(iat, Duration::seconds(60))).unwrap();
        assert_eq!(json["iat"], 1_704_067_200);
        assert_eq!(json["exp"], 1_704_067_260);
        assert_eq!(json["role"], "realtor");
    }
}
