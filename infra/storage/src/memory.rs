use crate::error::StoreError;
use crate::{PreferenceStore, Record};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

#[derive(Debug, Default)]
struct MemoryInner {
    record: RwLock<Record>,
    offline: AtomicBool,
}

/// Process-local preference store. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `record`.
    #[must_use]
    pub fn with_record(record: Record) -> Self {
        let store = Self::new();
        *store.inner.record.write() = record;
        store
    }

    /// While offline every read and write is rejected with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::Release);
    }

    /// A copy of everything stored.
    #[must_use]
    pub fn snapshot(&self) -> Record {
        self.inner.record.read().clone()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.inner.offline.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable {
                message: "memory store is offline".into(),
                context: None,
            });
        }
        Ok(())
    }
}

impl PreferenceStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Record, StoreError> {
        self.ensure_online()?;
        let record = self.inner.record.read();
        Ok(keys
            .iter()
            .filter_map(|key| record.get(*key).map(|value| ((*key).to_owned(), value.clone())))
            .collect())
    }

    async fn set(&self, values: Record) -> Result<(), StoreError> {
        self.ensure_online()?;
        trace!(keys = values.len(), "Memory store updated");
        self.inner.record.write().extend(values);
        Ok(())
    }
}
