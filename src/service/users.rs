//! User service backed by a `UserStore` and a shared read-through cache.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{keys, CacheStats, ReadThroughCache};
use crate::error::{AppError, Result, StoreError};
use crate::models::requests::{validate_email, validate_page};
use crate::models::{CreateUserRequest, UpdateUserRequest, User};
use crate::service::{TtlPolicy, ADMIN_EMAIL};
use crate::store::{Mutation, UserStore};

/// One cached query result. Each key prefix maps to exactly one variant.
#[derive(Debug, Clone)]
pub enum CachedView {
    User(User),
    Page(Vec<User>),
    Count(u64),
    EmailUnique(bool),
}

impl CachedView {
    fn kind(&self) -> &'static str {
        match self {
            CachedView::User(_) => "user",
            CachedView::Page(_) => "page",
            CachedView::Count(_) => "count",
            CachedView::EmailUnique(_) => "email-unique",
        }
    }
}

/// Cache holding every view of the user store.
pub type UserCache = ReadThroughCache<CachedView, StoreError>;

/// Lookup and mutation operations over users.
///
/// Cloning is cheap; clones share the store and the cache.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    cache: UserCache,
    ttl: TtlPolicy,
}

/// Converts a load failure, logging anything other than a missing record.
fn load_failed(op: &'static str, err: StoreError) -> AppError {
    if !err.is_not_found() {
        warn!(op, error = %err, "store load failed");
    }
    err.into()
}

/// A key returned a view of the wrong shape. Keys are built per query, so
/// this means a key collision bug.
fn view_mismatch(key: &str, view: &CachedView) -> AppError {
    AppError::Internal(format!("key '{}' holds a {} view", key, view.kind()))
}

impl UserService {
    /// Creates a service with its own empty cache.
    pub fn new(store: Arc<dyn UserStore>, ttl: TtlPolicy) -> Self {
        Self::with_cache(store, UserCache::new(), ttl)
    }

    /// Creates a service over an existing cache, which keeps its epoch.
    pub fn with_cache(store: Arc<dyn UserStore>, cache: UserCache, ttl: TtlPolicy) -> Self {
        Self { store, cache, ttl }
    }

    /// The cache this service reads through.
    pub fn cache(&self) -> &UserCache {
        &self.cache
    }

    // == Reads ==

    /// Fetches a user by id.
    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        let key = keys::user_by_id(id);
        let store = self.store.clone();
        let view = self
            .cache
            .get_or_load(&key, self.ttl.detail, move || async move {
                store.get_by_id(id).await.map(CachedView::User)
            })
            .await
            .map_err(|err| load_failed("get_user", err))?;

        match view {
            CachedView::User(user) => Ok(user),
            other => Err(view_mismatch(&key, &other)),
        }
    }

    /// Fetches a user by email, case-insensitively.
    pub async fn get_user_by_email(&self, email: &str) -> Result<User> {
        if let Some(msg) = validate_email(email) {
            return Err(AppError::InvalidRequest(msg));
        }

        let key = keys::user_by_email(email);
        let store = self.store.clone();
        let email = keys::normalize_email(email);
        let view = self
            .cache
            .get_or_load(&key, self.ttl.detail, move || async move {
                store.get_by_email(&email).await.map(CachedView::User)
            })
            .await
            .map_err(|err| load_failed("get_user_by_email", err))?;

        match view {
            CachedView::User(user) => Ok(user),
            other => Err(view_mismatch(&key, &other)),
        }
    }

    /// Returns one page of users ordered by email.
    pub async fn list_users(&self, page: u32, page_size: u32) -> Result<Vec<User>> {
        if let Some(msg) = validate_page(page, page_size) {
            return Err(AppError::InvalidRequest(msg));
        }

        let key = keys::user_page(page, page_size);
        let store = self.store.clone();
        let view = self
            .cache
            .get_or_load(&key, self.ttl.list, move || async move {
                store.list_page(page, page_size).await.map(CachedView::Page)
            })
            .await
            .map_err(|err| load_failed("list_users", err))?;

        match view {
            CachedView::Page(users) => Ok(users),
            other => Err(view_mismatch(&key, &other)),
        }
    }

    /// Total number of users.
    pub async fn count_users(&self) -> Result<u64> {
        let key = keys::user_count();
        let store = self.store.clone();
        let view = self
            .cache
            .get_or_load(&key, self.ttl.count, move || async move {
                store.count().await.map(CachedView::Count)
            })
            .await
            .map_err(|err| load_failed("count_users", err))?;

        match view {
            CachedView::Count(count) => Ok(count),
            other => Err(view_mismatch(&key, &other)),
        }
    }

    /// True when no user holds `email`.
    pub async fn is_email_unique(&self, email: &str) -> Result<bool> {
        if let Some(msg) = validate_email(email) {
            return Err(AppError::InvalidRequest(msg));
        }

        let key = keys::email_unique(email);
        let store = self.store.clone();
        let email = keys::normalize_email(email);
        let view = self
            .cache
            .get_or_load(&key, self.ttl.uniqueness, move || async move {
                store.is_email_unique(&email).await.map(CachedView::EmailUnique)
            })
            .await
            .map_err(|err| load_failed("is_email_unique", err))?;

        match view {
            CachedView::EmailUnique(unique) => Ok(unique),
            other => Err(view_mismatch(&key, &other)),
        }
    }

    // == Mutations ==

    /// Creates a user and returns its id.
    pub async fn create_user(&self, req: CreateUserRequest) -> Result<Uuid> {
        if let Some(msg) = req.validate() {
            return Err(AppError::InvalidRequest(msg));
        }
        if !self.is_email_unique(&req.email).await? {
            return Err(AppError::Conflict(format!(
                "A user with email '{}' already exists.",
                req.email.trim()
            )));
        }

        let user = User::new(req.email, req.first_name.trim(), req.last_name.trim());
        let id = user.id;
        self.commit(Mutation::Create(user)).await?;
        Ok(id)
    }

    /// Applies a partial update and returns the updated user.
    ///
    /// The current record is read from the store, not the cache.
    pub async fn update_user(&self, id: Uuid, req: UpdateUserRequest) -> Result<User> {
        if let Some(msg) = req.validate() {
            return Err(AppError::InvalidRequest(msg));
        }

        let mut user = self
            .store
            .get_by_id(id)
            .await
            .map_err(|err| load_failed("update_user", err))?;

        if let Some(email) = req.email {
            let email = email.trim().to_string();
            if keys::normalize_email(&email) != keys::normalize_email(&user.email)
                && !self
                    .store
                    .is_email_unique(&email)
                    .await
                    .map_err(|err| load_failed("update_user", err))?
            {
                return Err(AppError::Conflict(format!(
                    "A user with email '{}' already exists.",
                    email
                )));
            }
            user.email = email;
        }
        if let Some(first_name) = req.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = req.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(is_active) = req.is_active {
            user.is_active = is_active;
        }

        self.commit(Mutation::Update(user.clone())).await?;
        Ok(user)
    }

    /// Deletes a user.
    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        self.commit(Mutation::Delete(id)).await
    }

    /// Creates the admin account unless its email is already taken.
    ///
    /// Returns true when a user was created.
    pub async fn seed_admin(&self) -> Result<bool> {
        if !self.store.is_email_unique(ADMIN_EMAIL).await? {
            return Ok(false);
        }
        self.commit(Mutation::Create(User::new(ADMIN_EMAIL, "Admin", "User")))
            .await?;
        Ok(true)
    }

    /// Commits one mutation, then invalidates the cache.
    ///
    /// Invalidation happens only after the store reports success.
    async fn commit(&self, mutation: Mutation) -> Result<()> {
        let kind = mutation.kind();
        if let Err(err) = self.store.commit(mutation).await {
            warn!(kind, error = %err, "commit failed, cache left untouched");
            return Err(err.into());
        }

        let epoch = self.cache.invalidate();
        info!(kind, epoch, "mutation committed, cache invalidated");
        Ok(())
    }

    // == Diagnostics ==

    /// Snapshot of cache statistics.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Drops every cached entry without advancing the epoch.
    pub async fn clear_cache(&self) {
        self.cache.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryUserStore;

    fn service_with(users: Vec<User>) -> UserService {
        UserService::new(
            Arc::new(InMemoryUserStore::with_users(users)),
            TtlPolicy::default(),
        )
    }

    fn create_request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_user_caches_result() {
        let grace = User::new("grace@example.com", "Grace", "Hopper");
        let service = service_with(vec![grace.clone()]);

        assert_eq!(service.get_user(grace.id).await.unwrap(), grace);
        assert_eq!(service.get_user(grace.id).await.unwrap(), grace);

        let stats = service.cache_stats().await;
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_get_missing_user_is_not_found_and_not_cached() {
        let service = service_with(vec![]);
        let id = Uuid::new_v4();

        assert!(matches!(service.get_user(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.get_user(id).await, Err(AppError::NotFound(_))));
        assert_eq!(service.cache_stats().await.loads, 2);
    }

    #[tokio::test]
    async fn test_create_invalidates_exactly_once() {
        let service = service_with(vec![]);

        service.create_user(create_request("grace@example.com")).await.unwrap();

        assert_eq!(service.cache().epoch(), 1);
    }

    #[tokio::test]
    async fn test_failed_commit_does_not_invalidate() {
        let service = service_with(vec![]);

        let result = service.delete_user(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(service.cache().epoch(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let service = service_with(vec![User::new("grace@example.com", "Grace", "Hopper")]);

        let result = service.create_user(create_request("GRACE@example.com")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(service.cache().epoch(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = service_with(vec![]);

        let result = service.create_user(create_request("not-an-email")).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_update_changes_fields_and_invalidates() {
        let grace = User::new("grace@example.com", "Grace", "Hopper");
        let service = service_with(vec![grace.clone()]);
        service.get_user(grace.id).await.unwrap();

        let updated = service
            .update_user(
                grace.id,
                UpdateUserRequest {
                    last_name: Some("Murray Hopper".to_string()),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.last_name, "Murray Hopper");
        assert!(!updated.is_active);
        assert_eq!(service.get_user(grace.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let grace = User::new("grace@example.com", "Grace", "Hopper");
        let ada = User::new("ada@example.com", "Ada", "Lovelace");
        let service = service_with(vec![grace.clone(), ada]);

        let result = service
            .update_user(
                grace.id,
                UpdateUserRequest {
                    email: Some("Ada@Example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_users_validates_paging() {
        let service = service_with(vec![]);

        assert!(matches!(
            service.list_users(0, 10).await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(service.list_users(1, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let service = service_with(vec![]);

        assert!(service.seed_admin().await.unwrap());
        assert!(!service.seed_admin().await.unwrap());
        assert_eq!(service.count_users().await.unwrap(), 1);
        assert_eq!(
            service.get_user_by_email(ADMIN_EMAIL).await.unwrap().first_name,
            "Admin"
        );
    }

    #[tokio::test]
    async fn test_clear_cache_keeps_epoch() {
        let service = service_with(vec![]);
        service.count_users().await.unwrap();

        service.clear_cache().await;

        assert_eq!(service.cache_stats().await.total_entries, 0);
        assert_eq!(service.cache().epoch(), 0);
    }
}
