use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use crate::{
    error::StoreError,
    models::download_models::{DownloadStats, Platform},
    repositories::download_store::DownloadStore,
};

/// Counts events per platform with a single pass over every record.
///
/// Full scan over the store's records.
// TODO: push this down into a GROUP BY count in SqliteDownloadStore once the
// downloads table gets large enough for the scan to show up in stats latency.
pub fn aggregate<I>(platforms: I) -> DownloadStats
where
    I: IntoIterator<Item = Platform>,
{
    platforms
        .into_iter()
        .fold(DownloadStats::zero(), |mut stats, platform| {
            stats.total += 1;
            match platform {
                Platform::Mac => stats.mac += 1,
                Platform::Windows => stats.windows += 1,
            }
            stats
        })
}

struct CachedStats {
    stats: DownloadStats,
    fetched_at: Instant,
}

/// Aggregate download counts, cached for a bounded staleness window.
///
/// Readers that arrive while a refetch is running wait on the same lock and
/// reuse its result instead of scanning the store again.
pub struct StatsCache {
    store: Arc<dyn DownloadStore>,
    stale_after: Duration,
    cached: Mutex<Option<CachedStats>>,
}

impl StatsCache {
    pub fn new(store: Arc<dyn DownloadStore>, stale_after: Duration) -> Self {
        Self {
            store,
            stale_after,
            cached: Mutex::new(None),
        }
    }

    /// Current counts. Never fails: a store error yields all zeros, and the
    /// zeros are not cached so the next read tries the store again.
    pub async fn current(&self) -> DownloadStats {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < self.stale_after {
                return entry.stats;
            }
        }

        match self.fetch() {
            Ok(stats) => {
                tracing::debug!(
                    total = stats.total,
                    mac = stats.mac,
                    windows = stats.windows,
                    "Refreshed download stats"
                );
                *cached = Some(CachedStats {
                    stats,
                    fetched_at: Instant::now(),
                });
                stats
            }
            Err(e) => {
                tracing::warn!("Failed to fetch download stats, serving zeros: {}", e);
                DownloadStats::zero()
            }
        }
    }

    /// Reads every event from the store and aggregates, bypassing the cache.
    pub fn fetch(&self) -> Result<DownloadStats, StoreError> {
        let platforms = self.store.list_download_platforms()?;
        Ok(aggregate(platforms))
    }

    /// Forces the next `current` call to go to the store.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::download_store::MockDownloadStore;

    fn platforms(mac: usize, windows: usize) -> Vec<Platform> {
        let mut all = vec![Platform::Mac; mac];
        all.extend(vec![Platform::Windows; windows]);
        all
    }

    #[test]
    fn aggregate_counts_each_platform() {
        let stats = aggregate(platforms(3, 5));
        assert_eq!(stats, DownloadStats { total: 8, mac: 3, windows: 5 });
        assert_eq!(aggregate(Vec::new()), DownloadStats::zero());
    }

    #[tokio::test]
    async fn store_failure_degrades_to_zero() {
        let mut store = MockDownloadStore::new();
        store
            .expect_list_download_platforms()
            .returning(|| Err(StoreError::Unavailable("connection refused".to_string())));
        let cache = StatsCache::new(Arc::new(store), Duration::from_secs(30));

        assert_eq!(cache.current().await, DownloadStats { total: 0, mac: 0, windows: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn serves_cached_value_until_stale() {
        let mut store = MockDownloadStore::new();
        store
            .expect_list_download_platforms()
            .times(2)
            .returning(|| Ok(platforms(1, 2)));
        let cache = StatsCache::new(Arc::new(store), Duration::from_secs(30));

        assert_eq!(cache.current().await.total, 3);
        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.current().await.total, 3);
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.current().await.total, 3);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let mut store = MockDownloadStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_list_download_platforms()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(platforms(1, 0)));
        store
            .expect_list_download_platforms()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(platforms(1, 1)));
        let cache = StatsCache::new(Arc::new(store), Duration::from_secs(30));

        assert_eq!(cache.current().await.windows, 0);
        cache.invalidate().await;
        assert_eq!(cache.current().await.windows, 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried_on_next_read() {
        let mut store = MockDownloadStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_list_download_platforms()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(StoreError::Unavailable("timeout".to_string())));
        store
            .expect_list_download_platforms()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(platforms(2, 0)));
        let cache = StatsCache::new(Arc::new(store), Duration::from_secs(30));

        assert_eq!(cache.current().await, DownloadStats::zero());
        assert_eq!(cache.current().await.mac, 2);
    }
}
