pub mod sqlite;

use std::sync::Arc;

use crate::app::{BotError, Result};

pub use sqlite::SqliteSeenStore;

/// Durable record of items that have already been handled.
///
/// Markers are only ever added. `mark_seen` is create-if-absent and
/// reports whether this call created the marker.
pub trait SeenStore {
    fn exists(&self, item_id: &str) -> Result<bool>;
    fn mark_seen(&self, item_id: &str) -> Result<bool>;
}

pub type SharedStore = Arc<dyn SeenStore + Send + Sync>;

/// [`SeenStore::exists`] on the blocking pool.
pub async fn exists(store: &SharedStore, item_id: &str) -> Result<bool> {
    let item_id = item_id.to_string();
    off_thread(store, move |s| s.exists(&item_id)).await
}

/// [`SeenStore::mark_seen`] on the blocking pool.
pub async fn mark_seen(store: &SharedStore, item_id: &str) -> Result<bool> {
    let item_id = item_id.to_string();
    off_thread(store, move |s| s.mark_seen(&item_id)).await
}

/// `Err(DuplicateItem)` when `item_id` already has a marker.
pub async fn ensure_unseen(store: &SharedStore, item_id: &str) -> Result<()> {
    if exists(store, item_id).await? {
        return Err(BotError::DuplicateItem(item_id.to_string()));
    }
    Ok(())
}

/// A locked or busy database waits on a blocking thread, not a worker.
async fn off_thread<T, F>(store: &SharedStore, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn SeenStore) -> Result<T> + Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| BotError::Other(format!("store task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_async_helpers_share_markers_with_store() {
        let store: SharedStore = Arc::new(SqliteSeenStore::in_memory().unwrap());

        assert!(!exists(&store, "a1").await.unwrap());
        assert!(mark_seen(&store, "a1").await.unwrap());
        assert!(!mark_seen(&store, "a1").await.unwrap());
        assert!(exists(&store, "a1").await.unwrap());
        assert!(store.exists("a1").unwrap());
    }

    #[tokio::test]
    async fn test_ensure_unseen_reports_duplicate() {
        let store: SharedStore = Arc::new(SqliteSeenStore::in_memory().unwrap());
        ensure_unseen(&store, "a1").await.unwrap();

        store.mark_seen("a1").unwrap();
        let err = ensure_unseen(&store, "a1").await.unwrap_err();
        assert!(matches!(err, BotError::DuplicateItem(id) if id == "a1"));
    }
}
