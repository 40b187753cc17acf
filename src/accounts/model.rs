use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{password::verify_password, rank::Rank};
use crate::error::Result;

/// Account record as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt, never exposed in JSON
    pub points: i64,
    pub rank: Rank,
    #[serde(with = "time::serde::rfc3339")]
    pub join_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_active: OffsetDateTime,
}

impl User {
    /// Fresh record: no points, Bronze, both timestamps at `now`.
    pub(crate) fn new(username: String, email: String, password_hash: String) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            points: 0,
            rank: Rank::Bronze,
            join_date: now,
            last_active: now,
        }
    }

    /// Compares `candidate` against the stored hash.
    pub fn verify_password(&self, candidate: &str) -> Result<bool> {
        verify_password(candidate, &self.password_hash)
    }

    /// Re-derives `rank` from `points`. Touches nothing else.
    pub fn recompute_rank(&mut self) -> Rank {
        self.rank = Rank::from_points(self.points);
        self.rank
    }

    pub fn rank_is_current(&self) -> bool {
        self.rank == Rank::from_points(self.points)
    }

    pub fn public(&self) -> PublicUser {
        PublicUser::from(self)
    }
}

/// Registration input. The password is plaintext and lives only until hashed.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewAccount {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Partial update. `password: Some(_)` is the signal to re-hash.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub points: Option<i64>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.points.is_none()
    }
}

/// Public part of the user returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub points: i64,
    pub rank: Rank,
    pub points_to_next_rank: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub join_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_active: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            points: u.points,
            rank: u.rank,
            points_to_next_rank: Rank::points_to_next(u.points),
            join_date: u.join_date,
            last_active: u.last_active,
        }
    }
}
