//! Password hashing.
//!
//! A wrong password is `Ok(false)`. A hashing failure or an unreadable stored
//! digest is an error, so infrastructure faults are never reported as bad
//! credentials.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

use rentdesk_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl From<CredentialError> for DomainError {
    fn from(value: CredentialError) -> Self {
        DomainError::internal(value.to_string())
    }
}

/// One-way hashing of account passwords.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError>;

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, CredentialError>;
}

/// Argon2id hasher producing PHC strings.
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit cost parameters (memory in KiB, iterations, lanes).
    pub fn with_cost(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, CredentialError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| CredentialError::Hashing(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Hashing(e.to_string()))?;

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|phc| phc.to_string())
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(digest).map_err(|e| CredentialError::Hashing(e.to_string()))?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::Hashing(e.to_string())),
        }
    }
}
