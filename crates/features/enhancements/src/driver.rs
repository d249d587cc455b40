//! # Driver
//!
//! A single task owns the [`EnhancementManager`] and multiplexes three sources:
//! commands from the messaging surface, host events from the [`ChangeWatcher`], and the
//! scheduler's next deadline. Each wake-up runs to completion before the next one is
//! polled, so every pass is serialized.

use crate::dispatch::dispatch;
use crate::error::OverlayError;
use crate::manager::EnhancementManager;
use serde_json::Value;
use tcard_domain::protocol::Response;
use tcard_host::HostView;
use tcard_storage::PreferenceStore;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

#[derive(Debug)]
enum Command {
    Request { message: Value, reply: oneshot::Sender<Response> },
    Shutdown { reply: oneshot::Sender<()> },
}

/// Cloneable sender side of a running [`Driver`].
#[derive(Debug, Clone)]
pub struct DriverHandle {
    tx: mpsc::Sender<Command>,
}

impl DriverHandle {
    /// Sends one message and waits for its response.
    ///
    /// # Errors
    /// [`OverlayError::Stopped`] if the driver has exited.
    pub async fn request(&self, message: Value) -> Result<Response, OverlayError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Request { message, reply })
            .await
            .map_err(|_| OverlayError::Stopped { context: Some("Request not delivered".into()) })?;
        rx.await.map_err(|_| OverlayError::Stopped { context: Some("Request dropped".into()) })
    }

    /// Asks the driver to clean up and exit, waiting until it has.
    ///
    /// # Errors
    /// [`OverlayError::Stopped`] if the driver had already exited.
    pub async fn shutdown(&self) -> Result<(), OverlayError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Shutdown { reply })
            .await
            .map_err(|_| OverlayError::Stopped { context: None })?;
        rx.await.map_err(|_| OverlayError::Stopped { context: None })
    }
}

#[derive(Debug)]
pub struct Driver<H: HostView, S: PreferenceStore> {
    manager: EnhancementManager<H, S>,
    commands: mpsc::Receiver<Command>,
}

impl<H: HostView, S: PreferenceStore> Driver<H, S> {
    pub fn new(manager: EnhancementManager<H, S>, capacity: usize) -> (Self, DriverHandle) {
        let (tx, commands) = mpsc::channel(capacity.max(1));
        (Self { manager, commands }, DriverHandle { tx })
    }

    /// Initializes the manager and serves until shutdown or until every handle is dropped.
    ///
    /// Returns the cleaned-up manager.
    pub async fn run(mut self) -> EnhancementManager<H, S> {
        let mut watcher = self.manager.init().await;
        info!("Overlay driver started");

        loop {
            let deadline = self.manager.next_deadline();
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(Command::Request { message, reply }) => {
                        let response = dispatch(&mut self.manager, message).await;
                        let _ = reply.send(response);
                    },
                    Some(Command::Shutdown { reply }) => {
                        self.manager.cleanup();
                        let _ = reply.send(());
                        break;
                    },
                    None => {
                        self.manager.cleanup();
                        break;
                    },
                },
                Some(event) = watcher.next_event() => self.manager.on_host_event(event),
                () = wait_for(deadline) => {
                    let batch = self.manager.run_due(Instant::now());
                    debug!(?batch, "Scheduled passes ran");
                },
            }
        }

        info!("Overlay driver stopped");
        self.manager
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
