//! Incremental state: ids of places already enriched in some earlier run.
//!
//! The set only grows. It is loaded once, filtered against per city, and
//! flushed wholesale after each city under the same lock that guards the
//! in-memory set, so two flushes can never interleave.

use async_trait::async_trait;
use places_client::PlaceCandidate;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{StateError, StateResult};

/// Durable storage for the processed-id set.
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Stored ids; empty when nothing has been stored yet.
    async fn load(&self) -> StateResult<HashSet<String>>;

    /// Replace the stored set.
    async fn save(&self, ids: &HashSet<String>) -> StateResult<()>;
}

/// JSON array of id strings on disk.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateBackend for JsonFileBackend {
    async fn load(&self) -> StateResult<HashSet<String>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state file yet");
                return Ok(HashSet::new());
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let ids: Vec<String> = serde_json::from_str(&text).map_err(|source| StateError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(ids.into_iter().collect())
    }

    async fn save(&self, ids: &HashSet<String>) -> StateResult<()> {
        let sorted: BTreeSet<&String> = ids.iter().collect();
        let body = crate::sink::to_pretty_json(&sorted).map_err(|e| StateError::Write {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        let write_err = |source| StateError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        // Write beside the target and rename, so readers never see half a file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(write_err)?;
        Ok(())
    }
}

/// In-memory backend for tests.
#[derive(Default)]
pub struct MemoryBackend {
    stored: std::sync::Mutex<HashSet<String>>,
    saves: std::sync::atomic::AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids<I: IntoIterator<Item = S>, S: Into<String>>(ids: I) -> Self {
        let backend = Self::default();
        *backend.stored.lock().unwrap() = ids.into_iter().map(Into::into).collect();
        backend
    }

    pub fn stored(&self) -> HashSet<String> {
        self.stored.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl StateBackend for MemoryBackend {
    async fn load(&self) -> StateResult<HashSet<String>> {
        Ok(self.stored())
    }

    async fn save(&self, ids: &HashSet<String>) -> StateResult<()> {
        *self.stored.lock().unwrap() = ids.clone();
        self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

/// Synchronized processed-id set backed by a [`StateBackend`].
pub struct ProcessedIds {
    ids: Mutex<HashSet<String>>,
    backend: Arc<dyn StateBackend>,
}

impl ProcessedIds {
    pub async fn load(backend: Arc<dyn StateBackend>) -> StateResult<Self> {
        let ids = backend.load().await?;
        info!(count = ids.len(), "Loaded processed place ids");
        Ok(Self {
            ids: Mutex::new(ids),
            backend,
        })
    }

    pub async fn len(&self) -> usize {
        self.ids.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ids.lock().await.is_empty()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.ids.lock().await.contains(id)
    }

    /// Distinct candidate ids not yet processed, sorted.
    pub async fn unseen(&self, found: &[PlaceCandidate]) -> BTreeSet<String> {
        let ids = self.ids.lock().await;
        found
            .iter()
            .filter(|c| !ids.contains(&c.place_id))
            .map(|c| c.place_id.clone())
            .collect()
    }

    /// Add `new_ids` and persist the whole set while still holding the lock.
    /// Returns how many ids were actually new.
    pub async fn record_and_flush<I>(&self, new_ids: I) -> StateResult<usize>
    where
        I: IntoIterator<Item = String>,
    {
        let mut ids = self.ids.lock().await;
        let before = ids.len();
        ids.extend(new_ids);
        let added = ids.len() - before;

        self.backend.save(&ids).await?;
        debug!(added, total = ids.len(), "Flushed processed place ids");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(ids: &[&str]) -> Vec<PlaceCandidate> {
        ids.iter().map(|id| PlaceCandidate::new(*id, "x")).collect()
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("ids.json"));

        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ids.json");
        let backend = Arc::new(JsonFileBackend::new(&path));

        let state = ProcessedIds::load(backend.clone()).await.unwrap();
        state
            .record_and_flush(vec!["b".to_string(), "a".to_string()])
            .await
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let stored: Vec<String> = serde_json::from_str(&text).unwrap();
        assert_eq!(stored, ["a", "b"]);

        let reloaded = ProcessedIds::load(backend).await.unwrap();
        assert!(reloaded.contains("a").await);
        assert_eq!(reloaded.len().await, 2);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFileBackend::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StateError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_unseen_filters_and_dedups() {
        let state = ProcessedIds::load(Arc::new(MemoryBackend::with_ids(["old"])))
            .await
            .unwrap();

        let unseen = state.unseen(&found(&["new", "old", "new", "other"])).await;

        assert_eq!(
            unseen.into_iter().collect::<Vec<_>>(),
            ["new".to_string(), "other".to_string()]
        );
    }

    #[tokio::test]
    async fn test_record_only_grows() {
        let backend = Arc::new(MemoryBackend::with_ids(["a"]));
        let state = ProcessedIds::load(backend.clone()).await.unwrap();

        let added = state
            .record_and_flush(vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert_eq!(added, 1);
        assert_eq!(backend.stored().len(), 2);
        assert!(backend.stored().contains("a"));
    }

    #[tokio::test]
    async fn test_concurrent_flushes_serialize() {
        let backend = Arc::new(MemoryBackend::new());
        let state = Arc::new(ProcessedIds::load(backend.clone()).await.unwrap());

        let tasks: Vec<_> = (0..10)
            .map(|i| {
                let state = state.clone();
                tokio::spawn(async move { state.record_and_flush(vec![format!("id-{i}")]).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(backend.save_count(), 10);
        assert_eq!(backend.stored().len(), 10);
    }
}
