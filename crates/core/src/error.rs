//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every rejected request ends up as exactly one of these kinds. Components
/// keep their own narrower error enums and convert into this one at the
/// service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or out-of-range input; user-correctable.
    #[error("validation failed on '{field}': {message}")]
    Validation { field: String, message: String },

    /// Authenticated, but not permitted to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Missing, invalid or expired credentials.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Record absent, or outside the caller's visible scope.
    ///
    /// The two causes are deliberately indistinguishable.
    #[error("not found")]
    NotFound,

    /// A unique field is already taken (e.g. an account email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Collaborator failure (storage, hashing, signing).
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::Forbidden(_) => "forbidden",
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_names_the_field() {
        let err = DomainError::validation("price", "The price number must be between 0 and 10000");
        assert_eq!(err.code(), "validation_error");
        assert!(err.to_string().contains("'price'"));
    }

    #[test]
    fn not_found_carries_no_detail() {
        assert_eq!(DomainError::not_found().to_string(), "not found");
    }
}
