//! Service Module
//!
//! User lookups and mutations. Reads go through the read-through cache with a
//! TTL per query class; every committed mutation invalidates the whole cache.

mod users;

use std::time::Duration;

pub use users::{CachedView, UserCache, UserService};

/// Email seeded at startup when `SEED_ADMIN` is enabled.
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Staleness tolerance per query class.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    /// Lookups by id or email
    pub detail: Duration,
    /// List pages
    pub list: Duration,
    /// Total user count
    pub count: Duration,
    /// Email uniqueness checks, shorter because they guard the write path
    pub uniqueness: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            detail: Duration::from_secs(5 * 60),
            list: Duration::from_secs(5 * 60),
            count: Duration::from_secs(5 * 60),
            uniqueness: Duration::from_secs(2 * 60),
        }
    }
}
