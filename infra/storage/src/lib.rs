//! Preference persistence for the overlay agent.
//!
//! The overlay core treats preferences as an eventually consistent key/value record:
//! `get(keys)` returns whatever subset exists, `set(record)` merges the given keys. There is
//! no transaction across keys and no retry here; callers decide what a failure means.
//!
//! # Backends
//!
//! 1.  **[`MemoryStore`]**: process-local, cloneable, with an offline switch for exercising
//!     failure paths.
//! 2.  **[`FileStore`]**: a single JSON document on disk, rewritten with an atomic swap
//!     (unique temp file + `fsync` + `rename`) so a crash never leaves a torn file.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use tcard_storage::{MemoryStore, PreferenceStore, Record, StoreError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), StoreError> {
//!     let store = MemoryStore::new();
//!
//!     let mut record = Record::new();
//!     record.insert("redLineColor".into(), json!("rgb(214,45,32)"));
//!     store.set(record).await?;
//!
//!     let found = store.get(&["redLineColor", "missing"]).await?;
//!     assert_eq!(found.len(), 1);
//!     Ok(())
//! }
//! ```

mod builder;
mod error;
mod file;
mod memory;

pub use builder::FileStoreBuilder;
pub use error::{StoreError, StoreErrorExt};
pub use file::FileStore;
pub use memory::MemoryStore;

use std::fmt::Debug;
use std::future::Future;

/// A flat key/value record as exchanged with the store.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Asynchronous key/value preference backend.
pub trait PreferenceStore: Debug + Send + Sync {
    /// Returns the stored values for `keys`; absent keys are simply missing from the result.
    fn get(&self, keys: &[&str]) -> impl Future<Output = Result<Record, StoreError>> + Send;

    /// Merges `values` into the stored record.
    fn set(&self, values: Record) -> impl Future<Output = Result<(), StoreError>> + Send;
}
