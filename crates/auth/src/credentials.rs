//! Shape checks for emails and passwords.

use std::sync::LazyLock;

use regex::Regex;

use rentdesk_core::{DomainError, DomainResult};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("static email regex")
});

static PASSWORD_CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\d@$!%*#?&]{8,}$").expect("static password regex"));

const PASSWORD_SPECIALS: &str = "@$!%*#?&";

const PASSWORD_RULE: &str = "Password must contain 8 characters, one letter, one number and one special case character";

/// Validate an email and return its normalized (trimmed, lower-cased) form.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(DomainError::validation("email", "Email is required"));
    }
    if !EMAIL_RE.is_match(&email) {
        return Err(DomainError::validation("email", "Email is not valid type."));
    }
    Ok(email)
}

/// Validate password strength.
pub fn validate_password(raw: &str) -> DomainResult<()> {
    let ok = PASSWORD_CHARSET_RE.is_match(raw)
        && raw.chars().any(|c| c.is_ascii_alphabetic())
        && raw.chars().any(|c| c.is_ascii_digit())
        && raw.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if ok {
        Ok(())
    } else {
        Err(DomainError::validation("password", PASSWORD_RULE))
    }
}

/// Validate a password and its confirmation.
pub fn validate_new_password(password: &str, repassword: &str) -> DomainResult<()> {
    if password != repassword {
        return Err(DomainError::validation("repassword", "Passwords do not match"));
    }
    validate_password(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM ").unwrap(), "jane.doe@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "jane", "jane@", "@example.com", "jane@example", "jane@example.comma"] {
            assert!(normalize_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn password_needs_letter_digit_and_special() {
        assert!(validate_password("Passw0rd!").is_ok());
        assert!(validate_password("Password!").is_err());
        assert!(validate_password("Passw0rdd").is_err());
        assert!(validate_password("12345678!").is_err());
        assert!(validate_password("Pa0!").is_err());
        assert!(validate_password("Passw0rd!^").is_err());
    }

    #[test]
    fn mismatch_is_reported_before_strength() {
        let err = validate_new_password("weak", "weaker").unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "repassword"));
    }
}
