//! # Domain Models
//!
//! This crate contains pure domain types with minimal dependencies (`serde`, `thiserror`).
//! Keep it lean: no I/O, no host access, no timers. Just data and simple helpers.

pub mod color;
pub mod config;
pub mod constants;
pub mod enhancement;
pub mod preferences;
pub mod protocol;
