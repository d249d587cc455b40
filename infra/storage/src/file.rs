use crate::builder::FileStoreBuilder;
use crate::error::{StoreError, StoreErrorExt};
use crate::{PreferenceStore, Record};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const TMP_MARKER: &str = ".tcardtmp.";

#[derive(Debug)]
struct FileInner {
    path: PathBuf,
    tmp_counter: AtomicU64,
    // Serializes read-modify-write cycles of `set`.
    write_lock: Mutex<()>,
}

/// Preference store persisted as one JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Arc<FileInner>,
}

impl FileStore {
    #[must_use]
    pub fn builder() -> FileStoreBuilder {
        FileStoreBuilder::new()
    }

    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            inner: Arc::new(FileInner {
                path,
                tmp_counter: AtomicU64::new(1),
                write_lock: Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    async fn load(&self) -> Result<Record, StoreError> {
        let path = self.path();
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Record::new()),
            Err(err) => {
                return Err(StoreError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", path.display()).into()),
                });
            },
        };

        match serde_json::from_slice(&bytes).context("Failed to decode preference file")? {
            serde_json::Value::Object(record) => Ok(record),
            other => Err(StoreError::Corrupted {
                message: format!("expected a JSON object, found {other}").into(),
                context: Some(path.display().to_string().into()),
            }),
        }
    }

    /// Writes `record` with an atomic swap: unique temp file, `fsync`, then `rename`.
    async fn persist(&self, record: &Record) -> Result<(), StoreError> {
        let path = self.path();
        let data = serde_json::to_vec_pretty(record).context("Failed to encode preferences")?;
        let temp = unique_tmp_path(path, &self.inner.tmp_counter);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(&data).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StoreError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), path.display()).into(),
                ),
            });
        }

        debug!(path = %path.display(), "Preferences saved atomically");
        Ok(())
    }

    /// Removes temp files abandoned next to the target. Returns how many were removed.
    pub(crate) async fn purge_tmp(&self) -> usize {
        let path = self.path();
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            return 0;
        };
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
        let prefix = format!("{}{TMP_MARKER}", name.to_string_lossy());

        let Ok(mut entries) = fs::read_dir(dir).await else {
            return 0;
        };

        let mut removed = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            if !entry.file_name().to_string_lossy().starts_with(&prefix) {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(p = %entry.path().display(), err = %e, "Stale temp file not removed"),
            }
        }
        removed
    }
}

impl PreferenceStore for FileStore {
    async fn get(&self, keys: &[&str]) -> Result<Record, StoreError> {
        let mut record = self.load().await?;
        Ok(keys.iter().filter_map(|key| record.remove_entry(*key)).collect())
    }

    async fn set(&self, values: Record) -> Result<(), StoreError> {
        let _guard = self.inner.write_lock.lock().await;
        let mut record = self.load().await?;
        record.extend(values);
        self.persist(&record).await
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let tmp_name = format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id());
    target.with_file_name(tmp_name)
}
