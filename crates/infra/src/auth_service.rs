//! Login and signup flows.
//!
//! Argon2 work is CPU-bound and runs on the blocking pool so it never stalls
//! the async executor.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use rentdesk_auth::credentials::{normalize_email, validate_password};
use rentdesk_auth::{Account, CredentialHasher, JwtIssuer, NewAccount, Registration, RoleKind};
use rentdesk_core::{DomainError, DomainResult, UserId};

use crate::store::AccountStore;

/// Hash `plaintext` on the blocking pool.
pub(crate) async fn hash_password(hasher: Arc<dyn CredentialHasher>, plaintext: String) -> DomainResult<String> {
    tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
        .await
        .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?
        .map_err(DomainError::from)
}

/// Verify `plaintext` against `digest` on the blocking pool.
pub(crate) async fn verify_password(
    hasher: Arc<dyn CredentialHasher>,
    plaintext: String,
    digest: String,
) -> DomainResult<bool> {
    tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest))
        .await
        .map_err(|e| DomainError::internal(format!("verification task failed: {e}")))?
        .map_err(DomainError::from)
}

#[derive(Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl core::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Successful login: the account's identity fields plus a signed token.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: RoleKind,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    hasher: Arc<dyn CredentialHasher>,
    issuer: Arc<dyn JwtIssuer>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        hasher: Arc<dyn CredentialHasher>,
        issuer: Arc<dyn JwtIssuer>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            issuer,
        }
    }

    /// Exchange email + password for a token.
    ///
    /// Unknown email is `NotFound`, a wrong password is `Forbidden`. No token
    /// is signed unless the password verified.
    #[instrument(skip_all, err(Display))]
    pub async fn login(&self, request: LoginRequest) -> DomainResult<Session> {
        let email = normalize_email(request.email.as_deref().unwrap_or_default())?;
        let password = request.password.unwrap_or_default();
        if password.is_empty() {
            return Err(DomainError::validation("password", "Password is required"));
        }
        validate_password(&password)?;

        let account = self.accounts.find_by_email(&email).await?.ok_or_else(|| {
            tracing::debug!("login for unregistered email");
            DomainError::not_found()
        })?;

        let verified = verify_password(self.hasher.clone(), password, account.password_hash.clone()).await?;
        if !verified {
            tracing::debug!(user_id = %account.id, "login with wrong password");
            return Err(DomainError::forbidden("Password is incorrect"));
        }

        let token = self.issuer.issue(&account.identity(), Utc::now())?;
        tracing::info!(user_id = %account.id, role = %account.role, "login succeeded");
        Ok(Session {
            id: account.id,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            role: account.role,
            token,
        })
    }

    /// Self-service registration. The admin role is refused.
    #[instrument(skip_all, err(Display))]
    pub async fn signup(&self, payload: NewAccount) -> DomainResult<Account> {
        let validated = payload.validate(Registration::SelfSignup)?;
        if self.accounts.find_by_email(&validated.email).await?.is_some() {
            return Err(DomainError::conflict("Email is already taken"));
        }

        let password_hash = hash_password(self.hasher.clone(), validated.password.clone()).await?;
        let account = self
            .accounts
            .insert(Account::register(validated, password_hash, Utc::now()))
            .await?;
        tracing::info!(user_id = %account.id, role = %account.role, "account registered");
        Ok(account)
    }

    /// Create the bootstrap admin unless an account with `email` already
    /// exists. Returns the new account, or `None` when nothing was written.
    #[instrument(skip_all, err(Display))]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> DomainResult<Option<Account>> {
        let email = normalize_email(email)?;
        if self.accounts.find_by_email(&email).await?.is_some() {
            tracing::debug!("bootstrap admin already present");
            return Ok(None);
        }

        let validated = NewAccount {
            first_name: Some("Admin".to_string()),
            last_name: Some("Admin".to_string()),
            email: Some(email),
            password: Some(password.to_string()),
            repassword: Some(password.to_string()),
            role: Some(RoleKind::Admin.as_str().to_string()),
        }
        .validate(Registration::ByAdmin)?;
        let password_hash = hash_password(self.hasher.clone(), validated.password.clone()).await?;
        let account = self
            .accounts
            .insert(Account::register(validated, password_hash, Utc::now()))
            .await?;
        tracing::info!(user_id = %account.id, "bootstrap admin created");
        Ok(Some(account))
    }
}
