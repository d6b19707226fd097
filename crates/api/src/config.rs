//! Process configuration, read once at startup and passed explicitly.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` | listen address |
//! | `JWT_SECRET` | `dev-secret` (warns) | HS256 signing secret |
//! | `JWT_TTL_SECS` | `432000` (5 days) | token lifetime |
//! | `DATABASE_URL` | unset | Postgres stores when set, in-memory otherwise |
//! | `ADMIN_EMAIL` | unset | bootstrap admin created at startup if missing |
//! | `ADMIN_PASSWORD` | unset | password for the bootstrap admin |
//!
//! `ADMIN_EMAIL` and `ADMIN_PASSWORD` must be set together. Without them the
//! first admin has to be inserted into the accounts table by hand.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use rentdesk_auth::TokenConfig;
use rentdesk_auth::token::DEFAULT_TOKEN_TTL_SECS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BIND_ADDR is not a socket address: '{0}'")]
    InvalidBindAddr(String),

    #[error("JWT_TTL_SECS must be a positive integer, got '{0}'")]
    InvalidTtl(String),

    #[error("JWT_SECRET must not be empty")]
    EmptySecret,

    #[error("ADMIN_EMAIL and ADMIN_PASSWORD must be set together")]
    IncompleteAdminSeed,
}

/// Credentials for the admin account ensured at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub token: TokenConfig,
    pub database_url: Option<String>,
    pub admin: Option<AdminSeed>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(raw_addr.clone()))?;

        let secret = match lookup("JWT_SECRET") {
            Some(s) if s.is_empty() => return Err(ConfigError::EmptySecret),
            Some(s) => s,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_SECRET.to_string()
            }
        };

        let ttl_secs = match lookup("JWT_TTL_SECS") {
            None => DEFAULT_TOKEN_TTL_SECS,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ConfigError::InvalidTtl(raw))?,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let admin_email = lookup("ADMIN_EMAIL").filter(|v| !v.trim().is_empty());
        let admin_password = lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty());
        let admin = match (admin_email, admin_password) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteAdminSeed),
        };

        Ok(Self {
            bind_addr,
            token: TokenConfig::new(secret, Duration::seconds(ttl_secs)),
            database_url,
            admin,
        })
    }

    /// In-memory configuration with the given secret (local runs and tests).
    pub fn in_memory(secret: &str) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            token: TokenConfig::new(secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECS)),
            database_url: None,
            admin: None,
        }
    }

    pub fn with_admin(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin = Some(AdminSeed {
            email: email.into(),
            password: password.into(),
        });
        self
    }
}
