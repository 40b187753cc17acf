use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AccountError, Result};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 32;
pub const PASSWORD_MIN: usize = 6;
/// bcrypt ignores input past this many bytes.
pub const PASSWORD_MAX_BYTES: usize = 72;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns the trimmed username.
pub fn username(raw: &str) -> Result<String> {
    let name = raw.trim();
    let len = name.chars().count();
    if len < USERNAME_MIN {
        return Err(AccountError::validation(
            "username",
            format!("must be at least {USERNAME_MIN} characters"),
        ));
    }
    if len > USERNAME_MAX {
        return Err(AccountError::validation(
            "username",
            format!("must be at most {USERNAME_MAX} characters"),
        ));
    }
    Ok(name.to_string())
}

/// Returns the trimmed, lower-cased email.
pub fn email(raw: &str) -> Result<String> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        return Err(AccountError::validation("email", "not a valid address"));
    }
    Ok(email)
}

/// Checked before hashing; the plaintext is never altered.
pub fn password(plain: &str) -> Result<()> {
    if plain.chars().count() < PASSWORD_MIN {
        return Err(AccountError::validation(
            "password",
            format!("must be at least {PASSWORD_MIN} characters"),
        ));
    }
    if plain.len() > PASSWORD_MAX_BYTES {
        return Err(AccountError::validation(
            "password",
            format!("must be at most {PASSWORD_MAX_BYTES} bytes"),
        ));
    }
    Ok(())
}

pub fn points(points: i64) -> Result<i64> {
    if points < 0 {
        return Err(AccountError::validation("points", "cannot be negative"));
    }
    Ok(points)
}
