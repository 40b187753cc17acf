use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    model::{AccountUpdate, NewAccount, User},
    password::{verify_password_blocking, PasswordHasher},
    store::UserStore,
    validate,
};
use crate::error::{AccountError, Result};

/// Account operations over a [`UserStore`].
///
/// Every write runs as ordered steps: validate, hash if a new plaintext was
/// supplied, then persist. Nothing reaches the store when an earlier step fails.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl AccountService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn hasher(&self) -> PasswordHasher {
        self.hasher
    }

    #[instrument(skip(self, account), fields(username = %account.username))]
    pub async fn create(&self, account: NewAccount) -> Result<User> {
        let username = validate::username(&account.username)?;
        let email = validate::email(&account.email)?;
        validate::password(&account.password)?;

        let hash = self.hasher.hash_blocking(account.password).await?;

        let user = self.store.insert(&User::new(username, email, hash)).await.map_err(|e| {
            warn!(error = %e, "account insert rejected");
            e
        })?;

        info!(user_id = %user.id, email = %user.email, "account created");
        Ok(user)
    }

    async fn load(&self, id: Uuid) -> Result<User> {
        self.store.find_by_id(id).await?.ok_or(AccountError::NotFound)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<User>> {
        self.store.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.store.find_by_email(&validate::normalize_email(email)).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.store.find_by_username(username.trim()).await
    }

    /// Applies the given fields. A points change does not touch `rank`;
    /// call [`Self::recompute_rank`] afterwards.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: Uuid, update: AccountUpdate) -> Result<User> {
        let mut user = self.load(id).await?;
        if update.is_empty() {
            return Ok(user);
        }

        if let Some(username) = update.username {
            user.username = validate::username(&username)?;
        }
        if let Some(email) = update.email {
            user.email = validate::email(&email)?;
        }
        if let Some(points) = update.points {
            user.points = validate::points(points)?;
        }
        if let Some(password) = update.password {
            validate::password(&password)?;
            user.password_hash = self.hasher.hash_blocking(password).await?;
            debug!(user_id = %id, "password re-hashed");
        }

        let user = self.store.update(&user).await?;
        info!(user_id = %id, "account updated");
        Ok(user)
    }

    /// Re-derives the rank from the stored points and persists it.
    #[instrument(skip(self))]
    pub async fn recompute_rank(&self, id: Uuid) -> Result<User> {
        let mut user = self.load(id).await?;
        let before = user.rank;
        let after = user.recompute_rank();
        if before == after {
            return Ok(user);
        }
        let user = self.store.update(&user).await?;
        info!(user_id = %id, from = %before, to = %after, "rank changed");
        Ok(user)
    }

    /// Point-earning event: adjust points, then recompute rank, then persist.
    /// Points saturate at zero.
    #[instrument(skip(self))]
    pub async fn award_points(&self, id: Uuid, delta: i64) -> Result<User> {
        let mut user = self.load(id).await?;
        user.points = user.points.saturating_add(delta).max(0);
        let before = user.rank;
        let after = user.recompute_rank();
        user.last_active = OffsetDateTime::now_utc();

        let user = self.store.update(&user).await?;
        if before != after {
            info!(user_id = %id, from = %before, to = %after, "rank changed");
        }
        debug!(user_id = %id, points = user.points, delta, "points awarded");
        Ok(user)
    }

    /// Looks up by email and checks the password. Mutates nothing.
    #[instrument(skip(self, email, candidate))]
    pub async fn authenticate(&self, email: &str, candidate: &str) -> Result<User> {
        let email = validate::normalize_email(email);
        let Some(user) = self.store.find_by_email(&email).await? else {
            // same bcrypt work as a real comparison, result discarded
            let _ = self.hasher.hash_blocking(candidate.to_string()).await;
            warn!(email = %email, "login unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        let ok = verify_password_blocking(candidate.to_string(), user.password_hash.clone()).await?;
        if !ok {
            warn!(email = %email, user_id = %user.id, "login invalid password");
            return Err(AccountError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    /// Bumps `last_active` to now.
    pub async fn touch(&self, id: Uuid) -> Result<User> {
        let mut user = self.load(id).await?;
        user.last_active = OffsetDateTime::now_utc();
        self.store.update(&user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{memory::MemoryUserStore, rank::Rank};
    use crate::error::UniqueField;

    fn service_with(store: Arc<MemoryUserStore>, cost: u32) -> AccountService {
        AccountService::new(store, PasswordHasher::new(cost))
    }

    fn service() -> (AccountService, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::new());
        (service_with(store.clone(), 4), store)
    }

    fn fan(n: u32) -> NewAccount {
        NewAccount::new(format!("fan{n}"), format!("fan{n}@example.com"), "senha123")
    }

    #[tokio::test]
    async fn create_normalizes_and_hashes() {
        let (svc, _) = service();
        let user = svc
            .create(NewAccount::new("  furioso ", " Fan@Example.COM ", "senha123"))
            .await
            .unwrap();
        assert_eq!(user.username, "furioso");
        assert_eq!(user.email, "fan@example.com");
        assert_ne!(user.password_hash, "senha123");
        assert!(user.password_hash.starts_with("$2b$04$"));
        assert_eq!(user.points, 0);
        assert_eq!(user.rank, Rank::Bronze);
    }

    #[tokio::test]
    async fn verify_after_store_roundtrip() {
        let (svc, _) = service();
        let created = svc.create(fan(1)).await.unwrap();
        let loaded = svc.find(created.id).await.unwrap().unwrap();
        assert!(loaded.verify_password("senha123").unwrap());
        assert!(!loaded.verify_password("senha124").unwrap());
        assert!(!loaded.verify_password("").unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_case_insensitive() {
        let (svc, store) = service();
        svc.create(NewAccount::new("first", "fan@example.com", "senha123"))
            .await
            .unwrap();
        let err = svc
            .create(NewAccount::new("second", "FAN@Example.com", "senha123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::DuplicateKey(UniqueField::Email)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_username_is_reported() {
        let (svc, _) = service();
        svc.create(fan(1)).await.unwrap();
        let err = svc
            .create(NewAccount::new("fan1", "other@example.com", "senha123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::DuplicateKey(UniqueField::Username)));
    }

    #[tokio::test]
    async fn short_password_fails_validation() {
        let (svc, store) = service();
        let err = svc
            .create(NewAccount::new("furioso", "fan@example.com", "12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation { field: "password", .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn hashing_failure_persists_nothing() {
        let store = Arc::new(MemoryUserStore::new());
        let svc = service_with(store.clone(), 3);
        let err = svc.create(fan(1)).await.unwrap_err();
        assert!(matches!(err, AccountError::CredentialHashing(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn rank_example_walkthrough() {
        let (svc, _) = service();
        let user = svc.create(fan(1)).await.unwrap();
        assert_eq!(user.rank, Rank::Bronze);

        let upd = AccountUpdate {
            points: Some(1_000),
            ..Default::default()
        };
        let user = svc.update(user.id, upd).await.unwrap();
        assert_eq!(user.rank, Rank::Bronze, "update must not recompute rank");
        let user = svc.recompute_rank(user.id).await.unwrap();
        assert_eq!(user.rank, Rank::Ouro);

        let upd = AccountUpdate {
            points: Some(10_000),
            ..Default::default()
        };
        svc.update(user.id, upd).await.unwrap();
        let user = svc.recompute_rank(user.id).await.unwrap();
        assert_eq!(user.rank, Rank::GraoMestre);

        // idempotent
        let again = svc.recompute_rank(user.id).await.unwrap();
        assert_eq!(again, user);
    }

    #[tokio::test]
    async fn update_without_password_keeps_hash() {
        let (svc, _) = service();
        let user = svc.create(fan(1)).await.unwrap();
        let upd = AccountUpdate {
            username: Some("renamed".into()),
            ..Default::default()
        };
        let updated = svc.update(user.id, upd).await.unwrap();
        assert_eq!(updated.username, "renamed");
        assert_eq!(updated.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn update_with_password_rehashes() {
        let (svc, _) = service();
        let user = svc.create(fan(1)).await.unwrap();
        let upd = AccountUpdate {
            password: Some("nova-senha".into()),
            ..Default::default()
        };
        let updated = svc.update(user.id, upd).await.unwrap();
        assert_ne!(updated.password_hash, user.password_hash);
        assert!(updated.verify_password("nova-senha").unwrap());
        assert!(!updated.verify_password("senha123").unwrap());
    }

    #[tokio::test]
    async fn invalid_update_leaves_record_untouched() {
        let (svc, _) = service();
        let user = svc.create(fan(1)).await.unwrap();
        let upd = AccountUpdate {
            username: Some("ok-name".into()),
            password: Some("123".into()),
            ..Default::default()
        };
        let err = svc.update(user.id, upd).await.unwrap_err();
        assert!(matches!(err, AccountError::Validation { field: "password", .. }));
        assert_eq!(svc.find(user.id).await.unwrap().unwrap(), user);

        let upd = AccountUpdate {
            points: Some(-5),
            ..Default::default()
        };
        let err = svc.update(user.id, upd).await.unwrap_err();
        assert!(matches!(err, AccountError::Validation { field: "points", .. }));
    }

    #[tokio::test]
    async fn hashing_failure_on_update_leaves_record_untouched() {
        let (svc, store) = service();
        let user = svc.create(fan(1)).await.unwrap();

        let broken = service_with(store.clone(), 3);
        let upd = AccountUpdate {
            username: Some("renamed".into()),
            password: Some("nova-senha".into()),
            ..Default::default()
        };
        let err = broken.update(user.id, upd).await.unwrap_err();
        assert!(matches!(err, AccountError::CredentialHashing(_)));

        let stored = svc.find(user.id).await.unwrap().unwrap();
        assert_eq!(stored, user);
        assert!(stored.verify_password("senha123").unwrap());
    }

    #[tokio::test]
    async fn unknown_email_fails_even_when_hashing_breaks() {
        let store = Arc::new(MemoryUserStore::new());
        let svc = service_with(store, 3);
        let err = svc.authenticate("nobody@example.com", "senha123").await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn update_email_collision() {
        let (svc, _) = service();
        svc.create(fan(1)).await.unwrap();
        let second = svc.create(fan(2)).await.unwrap();
        let upd = AccountUpdate {
            email: Some("FAN1@example.com".into()),
            ..Default::default()
        };
        let err = svc.update(second.id, upd).await.unwrap_err();
        assert!(matches!(err, AccountError::DuplicateKey(UniqueField::Email)));
    }

    #[tokio::test]
    async fn award_points_keeps_rank_consistent() {
        let (svc, _) = service();
        let user = svc.create(fan(1)).await.unwrap();

        let user = svc.award_points(user.id, 499).await.unwrap();
        assert_eq!(user.rank, Rank::Bronze);
        let user = svc.award_points(user.id, 1).await.unwrap();
        assert_eq!((user.points, user.rank), (500, Rank::Prata));
        let user = svc.award_points(user.id, 7_000).await.unwrap();
        assert_eq!(user.rank, Rank::Mestre);
        let user = svc.award_points(user.id, -100_000).await.unwrap();
        assert_eq!((user.points, user.rank), (0, Rank::Bronze));
        assert!(user.rank_is_current());
    }

    #[tokio::test]
    async fn authenticate_paths() {
        let (svc, _) = service();
        let user = svc.create(fan(1)).await.unwrap();

        let logged = svc.authenticate(" FAN1@example.com", "senha123").await.unwrap();
        assert_eq!(logged.id, user.id);
        assert_eq!(logged, user, "login must not mutate the record");

        let err = svc.authenticate("fan1@example.com", "wrong-pass").await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidCredentials));

        let err = svc.authenticate("nobody@example.com", "senha123").await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn corrupted_hash_surfaces_as_error() {
        let (svc, store) = service();
        let mut user = svc.create(fan(1)).await.unwrap();
        user.password_hash = "garbage".into();
        store.update(&user).await.unwrap();

        let err = svc.authenticate("fan1@example.com", "senha123").await.unwrap_err();
        assert!(matches!(err, AccountError::CorruptCredential(_)));
    }

    #[tokio::test]
    async fn lookups_normalize_input() {
        let (svc, _) = service();
        let user = svc.create(fan(7)).await.unwrap();
        assert_eq!(svc.find_by_email("  FAN7@EXAMPLE.COM").await.unwrap(), Some(user.clone()));
        assert_eq!(svc.find_by_username(" fan7 ").await.unwrap(), Some(user));
        assert!(svc.find(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn touch_moves_last_active_only() {
        let (svc, _) = service();
        let user = svc.create(fan(1)).await.unwrap();
        let touched = svc.touch(user.id).await.unwrap();
        assert!(touched.last_active >= user.last_active);
        assert_eq!(touched.join_date, user.join_date);
        assert_eq!(touched.points, user.points);
    }

    #[tokio::test]
    async fn missing_account() {
        let (svc, _) = service();
        let id = Uuid::new_v4();
        assert!(matches!(svc.recompute_rank(id).await, Err(AccountError::NotFound)));
        assert!(matches!(svc.award_points(id, 5).await, Err(AccountError::NotFound)));
        assert!(matches!(
            svc.update(id, AccountUpdate::default()).await,
            Err(AccountError::NotFound)
        ));
    }
}
