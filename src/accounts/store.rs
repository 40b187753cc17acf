use async_trait::async_trait;
use uuid::Uuid;

use super::model::User;
use crate::error::Result;

/// Durable storage for account records.
///
/// Implementations enforce uniqueness of `username` and `email` and report a
/// collision as [`AccountError::DuplicateKey`](crate::error::AccountError::DuplicateKey).
/// Each call is all-or-nothing.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> Result<User>;
    /// Overwrites every mutable column of an existing record.
    async fn update(&self, user: &User) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}
