use std::sync::Arc;
use crate::{
    error::StoreError,
    models::download_models::{DownloadStats, Platform},
    repositories::download_store::DownloadStore,
    services::download_stats::StatsCache,
};

/// Records download events and keeps the shared stats cache honest for the
/// client that just wrote.
#[derive(Clone)]
pub struct DownloadTracker {
    store: Arc<dyn DownloadStore>,
    stats: Arc<StatsCache>,
}

impl DownloadTracker {
    pub fn new(store: Arc<dyn DownloadStore>, stats: Arc<StatsCache>) -> Self {
        Self { store, stats }
    }

    /// Inserts one event for `platform`. The stats cache is only invalidated
    /// when the insert succeeds; failures are handed back to the caller.
    pub async fn record(&self, platform: Platform) -> Result<(), StoreError> {
        self.store.insert_download(platform)?;
        tracing::info!(platform = %platform, "Recorded download");
        self.stats.invalidate().await;
        Ok(())
    }

    pub async fn stats(&self) -> DownloadStats {
        self.stats.current().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::repositories::download_store::{MockDownloadStore, SqliteDownloadStore};
    use std::time::Duration;

    fn sqlite_tracker() -> DownloadTracker {
        let store: Arc<dyn DownloadStore> = Arc::new(SqliteDownloadStore::new(memory_pool().unwrap()));
        let stats = Arc::new(StatsCache::new(store.clone(), Duration::from_secs(30)));
        DownloadTracker::new(store, stats)
    }

    #[tokio::test]
    async fn stats_match_every_recorded_download() {
        let tracker = sqlite_tracker();
        let sequence = [
            Platform::Mac,
            Platform::Windows,
            Platform::Windows,
            Platform::Mac,
            Platform::Windows,
            Platform::Windows,
            Platform::Mac,
        ];
        for platform in sequence {
            tracker.record(platform).await.unwrap();
        }

        let stats = tracker.stats().await;
        assert_eq!(stats.total, sequence.len() as u64);
        assert_eq!(stats.mac, 3);
        assert_eq!(stats.windows, 4);
    }

    #[tokio::test]
    async fn repeated_records_are_counted_separately() {
        let tracker = sqlite_tracker();
        let before = tracker.stats().await;
        tracker.record(Platform::Mac).await.unwrap();
        tracker.record(Platform::Mac).await.unwrap();

        // The first read was cached; recording must still show through.
        let after = tracker.stats().await;
        assert_eq!(after.mac, before.mac + 2);
        assert_eq!(after.total, before.total + 2);
    }

    #[tokio::test]
    async fn failed_insert_leaves_cache_untouched() {
        let mut store = MockDownloadStore::new();
        store
            .expect_insert_download()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("network".to_string())));
        store
            .expect_list_download_platforms()
            .times(1)
            .returning(|| Ok(vec![Platform::Windows]));
        let store: Arc<dyn DownloadStore> = Arc::new(store);
        let stats = Arc::new(StatsCache::new(store.clone(), Duration::from_secs(30)));
        let tracker = DownloadTracker::new(store, stats);

        assert_eq!(tracker.stats().await.windows, 1);
        assert!(tracker.record(Platform::Windows).await.is_err());
        // Still served from cache: list_download_platforms ran only once.
        assert_eq!(tracker.stats().await.windows, 1);
    }
}
