//! Persistence: the whole record as one JSON blob in a key-value slot.
//!
//! Loading fails soft: an unset key, an unreadable slot and unparsable JSON
//! all come back as `None`, and the session starts from the empty record.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use crate::errors::{BuilderError, Result};
use crate::models::resume::ResumeRecord;

/// Slot holding the serialized record.
pub const RESUME_DATA_KEY: &str = "resumeData";

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
}

// ────────────────────────────────────────────────────────────────────────────
// Stores
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.slots.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// One `<key>.json` file per slot under `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl ResumeStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        // atomic on the same filesystem
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Load / save
// ────────────────────────────────────────────────────────────────────────────

/// Loads the persisted record, or `None` when absent or unreadable.
pub async fn load_record(store: &dyn ResumeStore) -> Option<ResumeRecord> {
    let raw = match store.get(RESUME_DATA_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No persisted record under '{RESUME_DATA_KEY}'");
            return None;
        }
        Err(e) => {
            warn!("Failed to read persisted record: {e}");
            return None;
        }
    };

    match serde_json::from_str::<ResumeRecord>(&raw) {
        Ok(record) => {
            info!("Loaded persisted record '{}'", record.document_name());
            Some(record)
        }
        Err(e) => {
            warn!("Ignoring corrupt persisted record: {e}");
            None
        }
    }
}

/// Writes the whole record under [`RESUME_DATA_KEY`].
pub async fn save_record(store: &dyn ResumeStore, record: &ResumeRecord) -> Result<()> {
    let raw = serde_json::to_string(record)?;
    store.set(RESUME_DATA_KEY, raw).await?;
    debug!("Saved record '{}'", record.document_name());
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Debounced saver
// ────────────────────────────────────────────────────────────────────────────

/// Coalesces rapid saves: only the latest record is written, once the
/// input has been quiet for `delay`. `flush` forces the pending write.
pub struct DebouncedSaver {
    latest: watch::Sender<Option<Arc<ResumeRecord>>>,
    flush: mpsc::Sender<oneshot::Sender<Result<()>>>,
    task: JoinHandle<()>,
}

async fn write_latest(store: &dyn ResumeStore, rx: &watch::Receiver<Option<Arc<ResumeRecord>>>) -> Result<()> {
    let record = rx.borrow().clone();
    match record {
        Some(record) => save_record(store, &record).await,
        None => Ok(()),
    }
}

impl DebouncedSaver {
    pub fn spawn(store: Arc<dyn ResumeStore>, delay: Duration) -> Self {
        let (latest, mut rx) = watch::channel::<Option<Arc<ResumeRecord>>>(None);
        let (flush, mut flush_rx) = mpsc::channel::<oneshot::Sender<Result<()>>>(8);

        let task = tokio::spawn(async move {
            let deadline = sleep(delay);
            tokio::pin!(deadline);
            let mut dirty = false;

            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        dirty = true;
                        deadline.as_mut().reset(Instant::now() + delay);
                    }
                    _ = &mut deadline, if dirty => {
                        dirty = false;
                        if let Err(e) = write_latest(store.as_ref(), &rx).await {
                            error!("Debounced save failed: {e}");
                        }
                    }
                    Some(ack) = flush_rx.recv() => {
                        // a schedule racing the flush may not have been observed yet
                        let pending = dirty || rx.has_changed().unwrap_or(false);
                        dirty = false;
                        let result = if pending {
                            let _ = rx.borrow_and_update();
                            write_latest(store.as_ref(), &rx).await
                        } else {
                            Ok(())
                        };
                        let _ = ack.send(result);
                    }
                }
            }

            if dirty {
                if let Err(e) = write_latest(store.as_ref(), &rx).await {
                    error!("Final save failed: {e}");
                }
            }
            debug!("Debounced saver stopped");
        });

        Self { latest, flush, task }
    }

    /// Replaces the pending record; the previous pending one is dropped.
    pub fn schedule(&self, record: Arc<ResumeRecord>) {
        self.latest.send_replace(Some(record));
    }

    /// Writes the pending record now, if any.
    pub async fn flush(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        let stopped = || BuilderError::Storage(io::Error::other("debounced saver has stopped"));
        self.flush.send(ack).await.map_err(|_| stopped())?;
        done.await.map_err(|_| stopped())?
    }

    /// Flushes, stops the background task and waits for it.
    pub async fn shutdown(self) -> Result<()> {
        let result = self.flush().await;
        let Self { latest, flush, task } = self;
        drop(latest);
        drop(flush);
        if let Err(e) = task.await {
            error!("Debounced saver task panicked: {e}");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::compose::tests::{full_record, jane_doe};

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl ResumeStore for CountingStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value).await
        }
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let store = MemoryStore::new();
        let record = full_record();
        save_record(&store, &record).await.unwrap();
        assert_eq!(load_record(&store).await, Some(record));
    }

    #[tokio::test]
    async fn test_load_absent_is_none() {
        assert_eq!(load_record(&MemoryStore::new()).await, None);
    }

    #[tokio::test]
    async fn test_corrupt_blob_fails_soft() {
        let store = MemoryStore::new();
        store.set(RESUME_DATA_KEY, "{not json".to_string()).await.unwrap();
        assert_eq!(load_record(&store).await, None);
    }

    #[tokio::test]
    async fn test_blob_uses_original_key_and_shape() {
        let store = MemoryStore::new();
        save_record(&store, &jane_doe()).await.unwrap();
        let raw = store.get("resumeData").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["personalInfo"]["name"], "Jane Doe");
        assert_eq!(value["personalInfo"]["email"], "");
        assert_eq!(value["experience"][0]["endYear"], "");
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert_eq!(store.get(RESUME_DATA_KEY).await.unwrap(), None);

        let record = full_record();
        save_record(&store, &record).await.unwrap();
        assert!(dir.path().join("nested/resumeData.json").exists());
        assert!(!dir.path().join("nested/resumeData.json.tmp").exists());
        assert_eq!(load_record(&store).await, Some(record));

        // overwrite replaces the whole blob
        save_record(&store, &jane_doe()).await.unwrap();
        assert_eq!(load_record(&store).await, Some(jane_doe()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_saver_writes_latest_once() {
        let store = Arc::new(CountingStore::default());
        let saver = DebouncedSaver::spawn(store.clone(), Duration::from_millis(250));

        saver.schedule(Arc::new(ResumeRecord::empty()));
        saver.schedule(Arc::new(jane_doe()));
        saver.schedule(Arc::new(full_record()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(load_record(store.as_ref()).await, Some(full_record()));

        saver.shutdown().await.unwrap();
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_forces_pending_write() {
        let store = Arc::new(CountingStore::default());
        let saver = DebouncedSaver::spawn(store.clone(), Duration::from_secs(60));

        saver.schedule(Arc::new(jane_doe()));
        saver.flush().await.unwrap();
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(load_record(store.as_ref()).await, Some(jane_doe()));

        // nothing pending: flush is a no-op
        saver.flush().await.unwrap();
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        saver.shutdown().await.unwrap();
    }
}
