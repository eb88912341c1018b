use diesel::prelude::*;
use crate::{
    error::StoreError,
    models::download_models::{NewDownload, Platform},
    schema::downloads,
    DbPool,
};

/// The narrow persistence seam for download analytics. Everything above this
/// trait is independent of which backend holds the events.
#[cfg_attr(test, mockall::automock)]
pub trait DownloadStore: Send + Sync {
    /// Appends one download event. Never deduplicates.
    fn insert_download(&self, platform: Platform) -> Result<(), StoreError>;

    /// Platform of every recorded event, in no particular order.
    fn list_download_platforms(&self) -> Result<Vec<Platform>, StoreError>;
}

pub struct SqliteDownloadStore {
    pool: DbPool,
}

impl SqliteDownloadStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl DownloadStore for SqliteDownloadStore {
    fn insert_download(&self, platform: Platform) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(downloads::table)
            .values(&NewDownload { platform: platform.as_str() })
            .execute(&mut conn)?;
        Ok(())
    }

    fn list_download_platforms(&self) -> Result<Vec<Platform>, StoreError> {
        let mut conn = self.pool.get()?;
        let raw: Vec<String> = downloads::table
            .select(downloads::platform)
            .load(&mut conn)?;

        let platforms = raw
            .iter()
            .filter_map(|value| match value.parse::<Platform>() {
                Ok(platform) => Some(platform),
                Err(e) => {
                    tracing::warn!("Skipping download row: {}", e);
                    None
                }
            })
            .collect();
        Ok(platforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    #[test]
    fn inserts_are_listed_back_without_deduplication() {
        let store = SqliteDownloadStore::new(memory_pool().unwrap());
        store.insert_download(Platform::Mac).unwrap();
        store.insert_download(Platform::Mac).unwrap();
        store.insert_download(Platform::Windows).unwrap();

        let mut platforms = store.list_download_platforms().unwrap();
        platforms.sort_by_key(|p| p.as_str());
        assert_eq!(platforms, vec![Platform::Mac, Platform::Mac, Platform::Windows]);
    }

    #[test]
    fn insert_assigns_download_timestamp() {
        use crate::models::download_models::DownloadEvent;

        let pool = memory_pool().unwrap();
        let store = SqliteDownloadStore::new(pool.clone());
        store.insert_download(Platform::Windows).unwrap();

        let mut conn = pool.get().unwrap();
        let event = downloads::table
            .select(DownloadEvent::as_select())
            .first(&mut conn)
            .unwrap();
        assert_eq!(event.platform, "windows");
        assert!(event.downloaded_at > 0);
    }
}
