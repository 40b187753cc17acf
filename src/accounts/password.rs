use tracing::error;

use crate::error::{AccountError, Result};

/// Cost used when nothing else is configured.
pub const DEFAULT_COST: u32 = 10;

/// bcrypt hasher bound to a work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, plain: &str) -> Result<String> {
        bcrypt::hash(plain, self.cost).map_err(|e| {
            error!(error = %e, cost = self.cost, "bcrypt hash error");
            AccountError::CredentialHashing(e.to_string())
        })
    }

    /// Runs [`Self::hash`] on the blocking pool.
    pub async fn hash_blocking(&self, plain: String) -> Result<String> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| AccountError::CredentialHashing(e.to_string()))?
    }
}

/// `Ok(false)` on mismatch; an unparsable hash is an error.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(plain, hash).map_err(|e| {
        error!(error = %e, "bcrypt verify error");
        AccountError::CorruptCredential(e.to_string())
    })
}

pub async fn verify_password_blocking(plain: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .map_err(|e| AccountError::CorruptCredential(e.to_string()))?
}
