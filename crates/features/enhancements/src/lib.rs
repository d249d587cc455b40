//! Overlay enhancement slice for the timecard datagrid.
//!
//! Four cosmetic overlays decorate a host view this crate does not own: a totals
//! aggregator, weekend and alternate-row shading, and a dynamic boundary marker. The
//! [`EnhancementManager`] drives their lifecycle, persists preferences and keeps the two
//! shaders from corrupting each other's restore state through the [`OwnershipTable`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tcard_enhancements::EnhancementManager;
//! use tcard_host::MemoryHost;
//! use tcard_kernel::clock::SystemClock;
//! use tcard_kernel::domain::config::TimingConfig;
//! use tcard_storage::MemoryStore;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut manager = EnhancementManager::with_builtin(
//!         MemoryHost::new(),
//!         MemoryStore::new(),
//!         Arc::new(SystemClock),
//!         TimingConfig::default(),
//!     );
//!     let _watcher = manager.init().await;
//!     assert_eq!(manager.get_all_enhancements().len(), 4);
//!     manager.cleanup();
//! }
//! ```

mod dispatch;
mod driver;
mod error;
mod lifecycle;
mod manager;
mod ownership;
mod scheduler;
pub mod strategy;
mod watcher;

pub use dispatch::{decode_request, dispatch};
pub use driver::{Driver, DriverHandle};
pub use error::{OverlayError, OverlayErrorExt};
pub use lifecycle::Enhancement;
pub use manager::{CommandOutcome, EnhancementManager, PassCounter};
pub use ownership::{APPEARANCE, Claim, Owner, OwnershipTable};
pub use scheduler::{DueBatch, Pass, PassScheduler};
pub use watcher::ChangeWatcher;
