use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{model::User, store::UserStore};
use crate::error::{AccountError, Result, UniqueField};

pub const USERNAME_CONSTRAINT: &str = "users_username_key";
pub const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Row as read from `users`; `rank` is stored as its label.
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    points: i64,
    rank: String,
    join_date: OffsetDateTime,
    last_active: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(r: UserRow) -> std::result::Result<Self, Self::Error> {
        let rank = r
            .rank
            .parse()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Self {
            id: r.id,
            username: r.username,
            email: r.email,
            password_hash: r.password_hash,
            points: r.points,
            rank,
            join_date: r.join_date,
            last_active: r.last_active,
        })
    }
}

fn unique_field(constraint: &str) -> Option<UniqueField> {
    match constraint {
        USERNAME_CONSTRAINT => Some(UniqueField::Username),
        EMAIL_CONSTRAINT => Some(UniqueField::Email),
        _ => None,
    }
}

/// Unique violations on a known constraint become `DuplicateKey`; everything else passes through.
fn map_write_error(err: sqlx::Error) -> AccountError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if let Some(field) = db_err.constraint().and_then(unique_field) {
                return AccountError::DuplicateKey(field);
            }
        }
    }
    AccountError::Store(err)
}

const COLUMNS: &str = "id, username, email, password_hash, points, rank, join_date, last_active";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE {column} = $1"
        ))
        .bind(value)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::try_from).transpose()?)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, points, rank, join_date, last_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.points)
        .bind(user.rank.as_str())
        .bind(user.join_date)
        .bind(user.last_active)
        .fetch_one(&self.db)
        .await
        .map_err(map_write_error)?;
        Ok(User::try_from(row)?)
    }

    async fn update(&self, user: &User) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
               SET username = $2, email = $3, password_hash = $4,
                   points = $5, rank = $6, last_active = $7
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.points)
        .bind(user.rank.as_str())
        .bind(user.last_active)
        .fetch_optional(&self.db)
        .await
        .map_err(map_write_error)?
        .ok_or(AccountError::NotFound)?;
        Ok(User::try_from(row)?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_one("username", username).await
    }
}
