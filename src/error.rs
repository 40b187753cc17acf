use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AccountError>;

/// Field protected by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Username => f.write_str("username"),
            UniqueField::Email => f.write_str("email"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{0} already registered")]
    DuplicateKey(UniqueField),

    #[error("credential hashing failed: {0}")]
    CredentialHashing(String),

    #[error("stored credential is unreadable: {0}")]
    CorruptCredential(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl AccountError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AccountError::Validation {
            field,
            reason: reason.into(),
        }
    }
}
