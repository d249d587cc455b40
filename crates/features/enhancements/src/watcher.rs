use std::future;
use tcard_host::{HostEvent, MutationFeed};
use tracing::debug;

/// Receiving side of the host's structural observer.
///
/// Debouncing happens in the [`crate::PassScheduler`]; the watcher only delivers events and
/// notices when the host disconnected it.
#[derive(Debug)]
pub struct ChangeWatcher {
    feed: Option<MutationFeed>,
}

impl ChangeWatcher {
    pub(crate) const fn new(feed: MutationFeed) -> Self {
        Self { feed: Some(feed) }
    }

    /// A watcher that never yields, for a manager that was already started.
    #[must_use]
    pub const fn detached() -> Self {
        Self { feed: None }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.feed.is_some()
    }

    /// Next host event. Pends forever once the observer is gone.
    pub async fn next_event(&mut self) -> Option<HostEvent> {
        let Some(feed) = self.feed.as_mut() else {
            return future::pending().await;
        };
        let event = feed.recv().await;
        if event.is_none() {
            debug!("Host observer disconnected");
            self.feed = None;
        }
        event
    }
}
