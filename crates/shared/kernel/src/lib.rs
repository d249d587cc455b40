//! Kernel utilities shared across slices.
//! Keep this crate lightweight; it re-exports ergonomic helpers for config loading and
//! for reading the current calendar date.
//!
//! ## Config loading
//! ```rust,no_run
//! use tcard_kernel::config::load_config;
//! use tcard_kernel::domain::config::AgentConfig;
//!
//! let cfg: AgentConfig = load_config(Some("agent.toml")).unwrap_or_default();
//! assert!(cfg.timing.quiet_window_ms > 0);
//! ```
pub mod clock;
pub mod config;
mod error;

pub use crate::error::{KernelError, KernelErrorExt};
pub use tcard_domain as domain;
