//! Pending-operation queue shared by every source of update passes.
//!
//! Structural changes, the post-load one-shot, coordination settle timers and post-enable
//! refreshes all land here. The driver sleeps until [`PassScheduler::next_deadline`] and
//! then drains everything due in one batch, so two passes can never interleave.

use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pass {
    /// Re-run the lower-priority shader after `changed` was toggled.
    Coordinate { changed: String },
    /// Re-apply one enhancement shortly after it was enabled.
    Refresh { name: String },
    /// Debounced reaction to structural changes.
    Reactive,
    /// One-shot after the host finished loading.
    Loaded,
}

#[derive(Debug)]
struct Scheduled {
    due: Instant,
    pass: Pass,
}

/// Passes due at one instant, in execution order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DueBatch {
    pub coordinations: Vec<String>,
    pub refreshes: Vec<String>,
    /// Reactive and load passes coalesce into a single `update_all`.
    pub update_all: bool,
}

impl DueBatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.coordinations.is_empty() && self.refreshes.is_empty() && !self.update_all
    }
}

#[derive(Debug, Default)]
pub struct PassScheduler {
    pending: Vec<Scheduled>,
}

impl PassScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, pass: Pass, due: Instant) {
        self.pending.push(Scheduled { due, pass });
    }

    /// Restarts the quiet window: any pending reactive pass is replaced.
    pub fn debounce(&mut self, due: Instant) {
        self.pending.retain(|s| s.pass != Pass::Reactive);
        self.pending.push(Scheduled { due, pass: Pass::Reactive });
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|s| s.due).min()
    }

    /// Removes and returns everything due at `now`.
    pub fn take_due(&mut self, now: Instant) -> DueBatch {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|s| s.due <= now);
        self.pending = pending;
        due.sort_by_key(|s| s.due);

        let mut batch = DueBatch::default();
        for scheduled in due {
            match scheduled.pass {
                Pass::Coordinate { changed } => batch.coordinations.push(changed),
                Pass::Refresh { name } => batch.refreshes.push(name),
                Pass::Reactive | Pass::Loaded => batch.update_all = true,
            }
        }
        batch
    }

    #[must_use]
    pub fn is_pending(&self, pass: &Pass) -> bool {
        self.pending.iter().any(|s| &s.pass == pass)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
