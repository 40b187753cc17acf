use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{model::User, store::UserStore};
use crate::error::{AccountError, Result, UniqueField};

/// In-process store with the same uniqueness rules as the SQL schema.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

/// Username collisions are reported before email collisions.
fn collision(users: &HashMap<Uuid, User>, candidate: &User) -> Option<UniqueField> {
    let others = || users.values().filter(move |u| u.id != candidate.id);
    if others().any(|u| u.username == candidate.username) {
        Some(UniqueField::Username)
    } else if others().any(|u| u.email == candidate.email) {
        Some(UniqueField::Email)
    } else {
        None
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;
        if let Some(field) = collision(&users, user) {
            return Err(AccountError::DuplicateKey(field));
        }
        if users.contains_key(&user.id) {
            return Err(AccountError::Store(sqlx::Error::Protocol(format!(
                "primary key {} already present",
                user.id
            ))));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AccountError::NotFound);
        }
        if let Some(field) = collision(&users, user) {
            return Err(AccountError::DuplicateKey(field));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}
