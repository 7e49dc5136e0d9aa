//! User Store Module
//!
//! The persistent record store the cache fronts. Reads are side-effect free;
//! every change goes through the single `commit` point.

mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::User;

pub use memory::InMemoryUserStore;

/// A change to be applied atomically by `UserStore::commit`.
#[derive(Debug, Clone)]
pub enum Mutation {
    Create(User),
    Update(User),
    Delete(Uuid),
}

impl Mutation {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "create",
            Mutation::Update(_) => "update",
            Mutation::Delete(_) => "delete",
        }
    }
}

/// Backing store for user records.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Fetches a user by id; `NotFound` if absent.
    async fn get_by_id(&self, id: Uuid) -> Result<User, StoreError>;

    /// Fetches a user by email, compared case-insensitively; `NotFound` if absent.
    async fn get_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Returns one page of users ordered by email. `page` is 1-based.
    async fn list_page(&self, page: u32, page_size: u32) -> Result<Vec<User>, StoreError>;

    /// Total number of users.
    async fn count(&self) -> Result<u64, StoreError>;

    /// True when no user holds `email` (case-insensitive).
    async fn is_email_unique(&self, email: &str) -> Result<bool, StoreError>;

    /// Applies one mutation. Either the whole change is visible afterwards or
    /// none of it is.
    async fn commit(&self, mutation: Mutation) -> Result<(), StoreError>;
}
