//! In-memory `UserStore` used by the server binary and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::cache::keys::normalize_email;
use crate::error::StoreError;
use crate::models::User;
use crate::store::{Mutation, UserStore};

/// Users held in a `HashMap` behind a single lock, so each commit is atomic.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `users`.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|user| (user.id, user)).collect()),
        }
    }
}

/// Finds a user other than `except` holding `email`.
fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    let email = normalize_email(email);
    users
        .values()
        .any(|user| Some(user.id) != except && normalize_email(&user.email) == email)
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        let users = self.users.read().await;
        users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("No user found with id {}", id)))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
        let wanted = normalize_email(email);
        let users = self.users.read().await;
        users
            .values()
            .find(|user| normalize_email(&user.email) == wanted)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("No user found with email {}", email)))
    }

    async fn list_page(&self, page: u32, page_size: u32) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        let mut sorted: Vec<(String, &User)> = users
            .values()
            .map(|user| (normalize_email(&user.email), user))
            .collect();
        sorted.sort_by(|(a_email, a), (b_email, b)| a_email.cmp(b_email).then(a.id.cmp(&b.id)));

        let skip = (page.saturating_sub(1) as usize).saturating_mul(page_size as usize);
        Ok(sorted
            .into_iter()
            .skip(skip)
            .take(page_size as usize)
            .map(|(_, user)| user.clone())
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn is_email_unique(&self, email: &str) -> Result<bool, StoreError> {
        let users = self.users.read().await;
        Ok(!email_taken(&users, email, None))
    }

    async fn commit(&self, mutation: Mutation) -> Result<(), StoreError> {
        let kind = mutation.kind();
        let mut users = self.users.write().await;

        match mutation {
            Mutation::Create(user) => {
                if email_taken(&users, &user.email, None) {
                    return Err(StoreError::Conflict(format!(
                        "A user with email '{}' already exists.",
                        user.email
                    )));
                }
                users.insert(user.id, user);
            }
            Mutation::Update(user) => {
                if !users.contains_key(&user.id) {
                    return Err(StoreError::NotFound(format!("No user found with id {}", user.id)));
                }
                if email_taken(&users, &user.email, Some(user.id)) {
                    return Err(StoreError::Conflict(format!(
                        "A user with email '{}' already exists.",
                        user.email
                    )));
                }
                users.insert(user.id, user);
            }
            Mutation::Delete(id) => {
                if users.remove(&id).is_none() {
                    return Err(StoreError::NotFound(format!("No user found with id {}", id)));
                }
            }
        }

        debug!(kind, total = users.len(), "store commit applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new(email, "Test", "User")
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryUserStore::new();
        let alice = user("alice@example.com");

        store.commit(Mutation::Create(alice.clone())).await.unwrap();

        assert_eq!(store.get_by_id(alice.id).await.unwrap(), alice);
        assert_eq!(store.get_by_email("ALICE@example.com").await.unwrap(), alice);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = InMemoryUserStore::new();

        let err = store.get_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.get_by_email("ghost@example.com").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_duplicate_email_conflicts() {
        let store = InMemoryUserStore::with_users([user("dup@example.com")]);

        let result = store.commit(Mutation::Create(user("Dup@Example.com"))).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_email_uniqueness_is_case_insensitive() {
        let store = InMemoryUserStore::with_users([user("taken@example.com")]);

        assert!(!store.is_email_unique("TAKEN@example.com").await.unwrap());
        assert!(store.is_email_unique("free@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_keeps_own_email() {
        let mut bob = user("bob@example.com");
        let store = InMemoryUserStore::with_users([bob.clone()]);

        bob.first_name = "Robert".to_string();
        store.commit(Mutation::Update(bob.clone())).await.unwrap();

        assert_eq!(store.get_by_id(bob.id).await.unwrap().first_name, "Robert");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = InMemoryUserStore::new();

        let result = store.commit(Mutation::Update(user("x@example.com"))).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let carol = user("carol@example.com");
        let store = InMemoryUserStore::with_users([carol.clone()]);

        store.commit(Mutation::Delete(carol.id)).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        let again = store.commit(Mutation::Delete(carol.id)).await;
        assert!(matches!(again, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_page_orders_by_email() {
        let store = InMemoryUserStore::with_users(
            ["d@x.io", "a@x.io", "c@x.io", "b@x.io", "e@x.io"].map(user),
        );

        let first: Vec<String> = store
            .list_page(1, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        let third: Vec<String> = store
            .list_page(3, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();

        assert_eq!(first, vec!["a@x.io", "b@x.io"]);
        assert_eq!(third, vec!["e@x.io"]);
        assert!(store.list_page(4, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_page_ordering_ignores_case() {
        let store = InMemoryUserStore::with_users(["B@x.io", "a@x.io", "C@x.io"].map(user));

        let emails: Vec<String> = store
            .list_page(1, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();

        assert_eq!(emails, vec!["a@x.io", "B@x.io", "C@x.io"]);
    }
}
