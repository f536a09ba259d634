//! Local filesystem state store.
//!
//! Both documents are rewritten in full on every commit; simplicity over
//! write amplification, acceptable at this update frequency. Every write is
//! atomic (write-temp-then-rename) so a crash can tear the commit only
//! *between* the two documents, never inside one — and a torn commit
//! self-heals because membership is re-derived from the live snapshot on
//! the next cycle.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CollectionSnapshot, DetailMap, ItemDetail};
use crate::storage::{StateStore, StoredSnapshot, StoredState};

const SNAPSHOT_FILE: &str = "collection.json";
const DETAILS_FILE: &str = "item_details.json";
const AUDIT_FILE: &str = "update_log.txt";

/// State store backed by JSON documents in a local directory.
#[derive(Clone)]
pub struct JsonStateStore {
    root_dir: PathBuf,
}

impl JsonStateStore {
    /// Create a store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<StoredState> {
        let snapshot: Option<StoredSnapshot> = self.read_json(SNAPSHOT_FILE).await?;
        let details: DetailMap = self.read_json(DETAILS_FILE).await?.unwrap_or_default();
        Ok(StoredState { snapshot, details })
    }

    async fn commit(
        &self,
        snapshot: &CollectionSnapshot,
        deltas: &[ItemDetail],
        removed_ids: &[String],
    ) -> Result<()> {
        let stored = StoredSnapshot {
            snapshot: snapshot.clone(),
            committed_at: Utc::now(),
        };
        self.write_json(SNAPSHOT_FILE, &stored).await?;

        let mut details: DetailMap = self.read_json(DETAILS_FILE).await?.unwrap_or_default();
        for delta in deltas {
            details.insert(delta.id.clone(), delta.clone());
        }
        for id in removed_ids {
            details.remove(id);
        }
        self.write_json(DETAILS_FILE, &details).await?;

        log::info!(
            "Committed snapshot of {} members, {} detail records ({} merged, {} removed)",
            snapshot.len(),
            details.len(),
            deltas.len(),
            removed_ids.len()
        );
        Ok(())
    }

    async fn append_audit(&self, block: &str) -> Result<()> {
        let path = self.path(AUDIT_FILE);
        self.ensure_dir(&path).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(block.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::models::ItemDetail;

    fn detail(id: &str, title: &str) -> ItemDetail {
        ItemDetail {
            id: id.to_string(),
            title: title.to_string(),
            file_size: Some("10 MB".to_string()),
            posted_date: Some("1 Jan, 2026 @ 10:00am".to_string()),
            updated_date: None,
            image_url: None,
            changelog_url: Some("https://example.com/changelog/1".to_string()),
            last_checked: Utc::now(),
        }
    }

    fn snapshot(ids: &[&str]) -> CollectionSnapshot {
        CollectionSnapshot::new(
            ids.iter().map(|s| s.to_string()).collect(),
            json!({ "collectiondetails": [{ "children": ids }] }),
        )
    }

    #[tokio::test]
    async fn test_load_absent_state() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStateStore::new(tmp.path());

        let state = store.load().await.unwrap();
        assert!(state.snapshot.is_none());
        assert!(state.details.is_empty());
    }

    #[tokio::test]
    async fn test_commit_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStateStore::new(tmp.path());

        let snap = snapshot(&["A", "B"]);
        let deltas = vec![
            detail("A", "Map A"),
            // Sentinel with null fields must survive the round trip
            ItemDetail::unavailable("B"),
        ];
        store.commit(&snap, &deltas, &[]).await.unwrap();

        let state = store.load().await.unwrap();
        let stored = state.snapshot.unwrap();
        assert_eq!(stored.snapshot, snap);
        assert_eq!(state.details.len(), 2);
        assert_eq!(state.details["A"], deltas[0]);
        assert_eq!(state.details["B"], deltas[1]);
        assert!(state.details["B"].fetch_failed());
    }

    #[tokio::test]
    async fn test_commit_merges_and_removes() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStateStore::new(tmp.path());

        let deltas = vec![
            detail("A", "Map A"),
            detail("B", "Map B"),
            detail("C", "Map C"),
        ];
        store.commit(&snapshot(&["A", "B", "C"]), &deltas, &[]).await.unwrap();

        // B leaves the collection, A gets fresh detail
        let update = vec![detail("A", "Map A v2")];
        store
            .commit(&snapshot(&["A", "C"]), &update, &["B".to_string()])
            .await
            .unwrap();

        let state = store.load().await.unwrap();
        assert_eq!(state.details.len(), 2);
        assert_eq!(state.details["A"].title, "Map A v2");
        assert_eq!(state.details["C"].title, "Map C");
        assert!(!state.details.contains_key("B"));
    }

    #[tokio::test]
    async fn test_snapshot_replaced_wholesale() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStateStore::new(tmp.path());

        store.commit(&snapshot(&["A"]), &[], &[]).await.unwrap();
        let first = store.load().await.unwrap().snapshot.unwrap();

        store.commit(&snapshot(&["B"]), &[], &[]).await.unwrap();
        let second = store.load().await.unwrap().snapshot.unwrap();

        assert_ne!(first.snapshot, second.snapshot);
        assert_eq!(second.snapshot.item_ids, vec!["B"]);
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStateStore::new(tmp.path());

        store
            .commit(&snapshot(&["A"]), &[detail("A", "Map A")], &[])
            .await
            .unwrap();

        let mut entries = tokio::fs::read_dir(tmp.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name().into_string().unwrap();
            assert!(!name.ends_with(".tmp"), "stray temp file: {name}");
        }
    }

    #[tokio::test]
    async fn test_audit_appends() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStateStore::new(tmp.path());

        store.append_audit("first block\n").await.unwrap();
        store.append_audit("second block\n").await.unwrap();

        let content = tokio::fs::read_to_string(tmp.path().join(AUDIT_FILE))
            .await
            .unwrap();
        assert_eq!(content, "first block\nsecond block\n");
    }
}
