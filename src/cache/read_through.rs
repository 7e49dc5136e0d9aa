//! Read-Through Cache Module
//!
//! Serves lookups from memory when a valid entry exists and otherwise runs the
//! caller's loader, storing its result. Every entry is stamped with the epoch
//! its load started in; `invalidate()` advances the epoch and so invalidates
//! every entry at once without per-key bookkeeping.
//!
//! Concurrent misses for the same key within the same epoch share a single
//! loader invocation. A miss that starts after an invalidation never joins a
//! load that began before it.

use std::collections::HashMap;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, trace, warn};

use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CacheStats, Epoch};

/// A load shared between every waiter on the same key and epoch.
type Flight<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

// == Read-Through Cache ==
/// In-memory read-through cache with TTL expiry and epoch invalidation.
///
/// Cloning is cheap and every clone shares the same entries and epoch.
pub struct ReadThroughCache<V, E> {
    inner: Arc<Inner<V, E>>,
}

struct Inner<V, E> {
    /// Key to entry storage
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    /// Loads currently running, keyed by (key, epoch at load start)
    in_flight: Mutex<HashMap<(String, u64), Flight<V, E>>>,
    /// Generation stamp for bulk invalidation
    epoch: Epoch,
    /// Performance counters
    stats: StatsCounters,
}

impl<V, E> Clone for ReadThroughCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V, E> Default for ReadThroughCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> ReadThroughCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache at epoch 0.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
                epoch: Epoch::new(),
                stats: StatsCounters::default(),
            }),
        }
    }

    // == Get Or Load ==
    /// Returns the cached value for `key`, or loads and caches it.
    ///
    /// On a miss `loader` is called to build the load future, unless a load
    /// for the same key is already running in the current epoch, in which case
    /// this call waits on that load instead. The entry expires `ttl` after it
    /// is stored; reads do not extend it.
    ///
    /// Loader errors are returned unchanged and nothing is cached. Every
    /// waiter on a failed load receives the same error.
    ///
    /// The entry map lock is never held while the loader runs. Dropping the
    /// returned future drops this caller's interest in the load; the cache
    /// adds no timeout of its own.
    pub async fn get_or_load<F, Fut>(&self, key: &str, ttl: Duration, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let epoch = self.inner.epoch.current();

        if let Some(value) = self.inner.lookup(key, epoch).await {
            self.inner.stats.record_hit();
            trace!(key, epoch, "cache hit");
            return Ok(value);
        }

        let flight = {
            let mut in_flight = self.inner.in_flight.lock().await;

            // A flight may have landed between the first lookup and the lock.
            if let Some(value) = self.inner.lookup(key, epoch).await {
                self.inner.stats.record_hit();
                trace!(key, epoch, "cache hit after in-flight check");
                return Ok(value);
            }

            self.inner.stats.record_miss();
            let slot = (key.to_string(), epoch);
            match in_flight.get(&slot) {
                Some(flight) => {
                    self.inner.stats.record_coalesced();
                    debug!(key, epoch, "cache miss, joining in-flight load");
                    flight.clone()
                }
                None => {
                    debug!(key, epoch, "cache miss, loading");
                    let flight = Inner::fly(self.inner.clone(), key.to_string(), epoch, ttl, loader())
                        .boxed()
                        .shared();
                    in_flight.insert(slot, flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    // == Invalidate ==
    /// Advances the epoch, invalidating every entry stored so far.
    ///
    /// Returns the new epoch. Safe to call concurrently with any number of
    /// in-flight lookups.
    pub fn invalidate(&self) -> u64 {
        let epoch = self.inner.epoch.advance();
        self.inner.stats.record_invalidation();
        debug!(epoch, "cache invalidated");
        epoch
    }

    /// Returns the current epoch.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.current()
    }

    // == Count Valid Entries ==
    /// Counts resident entries that are still valid.
    pub async fn count_valid_entries(&self) -> usize {
        let epoch = self.inner.epoch.current();
        let entries = self.inner.entries.read().await;
        entries.values().filter(|entry| entry.is_valid(epoch)).count()
    }

    // == Clear ==
    /// Removes every resident entry. Loads already in flight still complete.
    pub async fn clear(&self) {
        let mut entries = self.inner.entries.write().await;
        let removed = entries.len();
        entries.clear();
        info!(removed, "cache cleared");
    }

    // == Sweep ==
    /// Physically removes entries that are no longer valid, along with
    /// abandoned in-flight slots from earlier epochs.
    ///
    /// Returns the number of entries removed.
    pub async fn sweep(&self) -> usize {
        let epoch = self.inner.epoch.current();

        let removed = {
            let mut entries = self.inner.entries.write().await;
            let before = entries.len();
            entries.retain(|_, entry| entry.is_valid(epoch));
            before - entries.len()
        };

        let mut in_flight = self.inner.in_flight.lock().await;
        in_flight.retain(|(_, slot_epoch), _| *slot_epoch == epoch);

        removed
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let epoch = self.inner.epoch.current();
        let (total, valid) = {
            let entries = self.inner.entries.read().await;
            let valid = entries.values().filter(|entry| entry.is_valid(epoch)).count();
            (entries.len(), valid)
        };
        self.inner.stats.snapshot(total, valid, epoch)
    }

    // == Length ==
    /// Returns the number of resident entries, valid or not.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are resident.
    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }
}

impl<V, E> Inner<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Returns a clone of the value if a valid entry exists.
    async fn lookup(&self, key: &str, epoch: u64) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_valid(epoch))
            .map(|entry| entry.value.clone())
    }

    /// Runs one load and commits its outcome.
    ///
    /// A value is stored only if the epoch has not moved since the load
    /// started; otherwise it may predate a committed mutation. A panicking
    /// loader still frees its slot before the panic reaches the waiters.
    async fn fly<Fut>(inner: Arc<Self>, key: String, epoch: u64, ttl: Duration, load: Fut) -> Result<V, E>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        inner.stats.record_load();
        let result = match AssertUnwindSafe(load).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                inner.stats.record_load_failure();
                inner.in_flight.lock().await.remove(&(key.clone(), epoch));
                warn!(key = %key, epoch, "loader panicked, slot released");
                panic::resume_unwind(payload);
            }
        };

        match &result {
            Ok(value) => {
                let mut entries = inner.entries.write().await;
                if inner.epoch.current() == epoch {
                    entries.insert(key.clone(), CacheEntry::new(value.clone(), epoch, ttl));
                } else {
                    debug!(key = %key, epoch, "epoch advanced during load, result not cached");
                }
            }
            Err(_) => {
                inner.stats.record_load_failure();
                debug!(key = %key, epoch, "load failed, nothing cached");
            }
        }

        inner.in_flight.lock().await.remove(&(key, epoch));
        result
    }
}
