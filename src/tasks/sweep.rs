//! Cache Sweep Task
//!
//! Background task that periodically reclaims cache entries that are no
//! longer valid. Lookups never depend on it; it only bounds memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ReadThroughCache;

/// Spawns a background task that periodically sweeps invalid cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. An interval of zero is treated as one second.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = ReadThroughCache::<String, String>::new();
/// let sweep_handle = spawn_sweep_task(cache.clone(), 30);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V, E>(cache: ReadThroughCache<V, E>, sweep_interval_secs: u64) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(sweep_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.sweep().await;

            if removed > 0 {
                info!(epoch = cache.epoch(), "Cache sweep: removed {} invalid entries", removed);
            } else {
                debug!("Cache sweep: no invalid entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future;

    type TestCache = ReadThroughCache<String, String>;

    async fn load(cache: &TestCache, key: &str, ttl: Duration) {
        let value = key.to_string();
        cache
            .get_or_load(key, ttl, move || future::ready(Ok(value)))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_removes_expired_entries() {
        let cache = TestCache::new();
        load(&cache, "expire_soon", Duration::from_secs(1)).await;

        let handle = spawn_sweep_task(cache.clone(), 1);

        // Let the entry expire and the sweep run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(cache.is_empty().await, "Expired entry should have been swept");
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_removes_invalidated_entries() {
        let cache = TestCache::new();
        load(&cache, "stale", Duration::from_secs(3600)).await;
        cache.invalidate();

        let handle = spawn_sweep_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.is_empty().await, "Invalidated entry should have been swept");
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_preserves_valid_entries() {
        let cache = TestCache::new();
        load(&cache, "long_lived", Duration::from_secs(3600)).await;

        let handle = spawn_sweep_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.count_valid_entries().await, 1, "Valid entry should not be removed");
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let handle = spawn_sweep_task(TestCache::new(), 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
