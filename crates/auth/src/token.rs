//! Identity token issuing and verification (HS256 JWT).
//!
//! The signing secret and token lifetime are process-wide configuration: they
//! are loaded once at startup into a [`TokenConfig`] and handed to the issuer
//! at construction, never derived from request input.
//!
//! There is no revocation list. A token stays valid until it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use rentdesk_core::DomainError;

use crate::{Identity, IdentityClaims, TokenValidationError, validate_claims};

/// Default token lifetime: five days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 5 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for DomainError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Signing(msg) => DomainError::internal(msg),
            _ => DomainError::Unauthenticated,
        }
    }
}

/// Signing configuration.
#[derive(Clone)]
pub struct TokenConfig {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl core::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Mints tokens for authenticated identities.
pub trait JwtIssuer: Send + Sync {
    fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, TokenError>;
}

/// Verifies tokens and yields their claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, TokenError>;
}

/// HS256 implementation of both halves.
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256Jwt {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            ttl: config.ttl,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);
        validation
    }
}

impl JwtIssuer for Hs256Jwt {
    fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = IdentityClaims::new(identity, now, self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, TokenError> {
        let data = jsonwebtoken::decode::<IdentityClaims>(token, &self.decoding, &Self::validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Claims(TokenValidationError::Expired),
                _ => TokenError::Malformed(e.to_string()),
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
