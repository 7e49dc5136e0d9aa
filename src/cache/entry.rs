//! Cache Entry Module
//!
//! Defines a single cached value stamped with the epoch it was loaded in and
//! a fixed expiry deadline.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A cached value with its creation epoch and expiry deadline.
///
/// Entries are replaced wholesale on a fresh load and never mutated in place.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,
    /// Epoch observed when the load that produced this value began
    pub epoch: u64,
    /// When the entry was stored
    pub created_at: Instant,
    /// Deadline after which the entry is treated as a miss
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    ///
    /// Expiry is fixed at creation; reading the entry does not extend it.
    pub fn new(value: V, epoch: u64, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            epoch,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks whether the TTL has elapsed.
    ///
    /// Boundary condition: the entry is expired once `now >= expires_at`.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Is Valid ==
    /// An entry is valid iff it belongs to `current_epoch` and has not expired.
    pub fn is_valid(&self, current_epoch: u64) -> bool {
        self.epoch == current_epoch && !self.is_expired()
    }

    /// Returns remaining TTL, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_valid_when_fresh() {
        let entry = CacheEntry::new("alice", 0, Duration::from_secs(60));

        assert_eq!(entry.value, "alice");
        assert!(!entry.is_expired());
        assert!(entry.is_valid(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_invalid_after_epoch_advance() {
        let entry = CacheEntry::new(1u32, 3, Duration::from_secs(60));

        assert!(entry.is_valid(3));
        assert!(!entry.is_valid(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiration() {
        let entry = CacheEntry::new(1u32, 0, Duration::from_secs(1));

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(entry.is_valid(0));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(entry.is_expired());
        assert!(!entry.is_valid(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining() {
        let entry = CacheEntry::new(1u32, 0, Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(6));

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new(1u32, 0, Duration::ZERO);

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }
}
