use crate::error::{StoreError, StoreErrorExt};
use crate::file::FileStore;
use private::Sealed;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

#[derive(Debug, Default)]
pub struct NoPath;
#[derive(Debug)]
pub struct WithPath(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoPath {}
impl Sealed for WithPath {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct FileStoreBuilder<S: Sealed = NoPath> {
    state: S,
    create: bool,
}

#[allow(private_bounds)]
impl<S: Sealed> FileStoreBuilder<S> {
    #[must_use = "Sets whether missing parent directories should be created"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }
}

impl FileStoreBuilder<NoPath> {
    #[must_use = "Creates a new file store builder"]
    pub fn new() -> Self {
        Self { state: NoPath, create: true }
    }

    #[must_use = "Sets the JSON file backing the store"]
    pub fn path(self, path: impl Into<PathBuf>) -> FileStoreBuilder<WithPath> {
        FileStoreBuilder { state: WithPath(path.into()), create: self.create }
    }
}

impl FileStoreBuilder<WithPath> {
    /// Consumes the configuration and opens the store.
    ///
    /// 1. **Bootstrapping**: Creates the parent directory if `create(true)` was set.
    /// 2. **Self-Healing**: Removes temp files left next to the target by an interrupted write.
    ///
    /// The file itself is created lazily on the first write; a missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the parent directory cannot be created.
    pub async fn open(self) -> Result<FileStore, StoreError> {
        let path = self.state.0;

        if self.create
            && let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to bootstrap store directory: {}", parent.display()))?;
        }

        let store = FileStore::new(path);
        let purged = store.purge_tmp().await;
        info!(path = %store.path().display(), purged, "Preference file store opened");
        Ok(store)
    }
}
