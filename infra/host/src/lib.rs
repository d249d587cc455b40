//! # Host View
//!
//! The overlay core never owns the tabular view it decorates. This crate describes the
//! narrow surface it is allowed to touch and ships an in-memory implementation used by
//! the agent binary and by tests.
//!
//! ## Overview
//!
//! * [`HostView`]: structural queries by class, id, tag and sibling position; read/write of
//!   text, inline style properties, the class list, and free-form key/value tags.
//! * [`ElementId`]: a stable arena key. Identifiers are never reused, so a key that outlives
//!   its element simply stops resolving.
//! * [`HostEvent`]: structural changes (children inserted/removed, text replaced) and the
//!   one-time load notification, delivered over a [`MutationFeed`].
//! * [`MemoryHost`]: a cloneable handle to a shared document, built from [`ElementFixture`] trees.
//!
//! # Example
//!
//! ```rust
//! use tcard_host::{ElementFixture, HostView, MemoryHost, Selector};
//!
//! let host = MemoryHost::from_fixture(
//!     ElementFixture::new()
//!         .child(ElementFixture::new().class("cell").style("left", "0px").text("Mon,Aug 04"))
//!         .child(ElementFixture::new().class("cell").style("left", "80px").text("Tue,Aug 05")),
//! );
//!
//! let cells = host.select(&Selector::class("cell"));
//! assert_eq!(cells.len(), 2);
//! assert_eq!(host.style(cells[1], "left").as_deref(), Some("80px"));
//! ```

mod document;
mod error;
mod fixture;
mod selector;
mod view;

pub use document::MemoryHost;
pub use error::{HostError, HostErrorExt};
pub use fixture::ElementFixture;
pub use selector::Selector;
pub use view::{ElementId, HostEvent, HostView, MutationFeed, MutationKind};
