//! # Timecard Overlay Agent
//!
//! Hosts the enhancement driver over a host-view snapshot and serves the messaging
//! protocol as newline-delimited JSON: one request object per input line, one response
//! object per output line.
//!
//! ## Example
//! ```no_run
//! use tcard_agent::Agent;
//! use tokio::io::{BufReader, stdin, stdout};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     Agent::builder()
//!         .fixture("grid.json")
//!         .build()
//!         .await?
//!         .run(BufReader::new(stdin()), &mut stdout())
//!         .await
//! }
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tcard_domain::config::{AgentConfig, LoggingConfig};
use tcard_domain::protocol::Response;
use tcard_enhancements::{Driver, EnhancementManager, OverlayError};
use tcard_host::MemoryHost;
use tcard_kernel::clock::SystemClock;
use tcard_logger::{Logger, parse_level};
use tcard_storage::{FileStore, MemoryStore, PreferenceStore};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::signal;
use tracing::{debug, info, warn};

const COMMAND_CAPACITY: usize = 32;

/// Installs the global subscriber described by the `logging` section.
///
/// # Errors
/// Fails on an unknown level, a malformed filter or a second initialization.
pub fn init_logger(cfg: &LoggingConfig) -> Result<Logger> {
    let mut builder = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(parse_level(&cfg.level)?)
        .json(cfg.json);
    if let Some(directory) = &cfg.directory {
        builder = builder.directory(directory);
    }
    if let Some(filter) = &cfg.filter {
        builder = builder.env_filter(filter);
    }
    Ok(builder.init()?)
}

/// A fluent builder for configuring and initializing the [`Agent`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct AgentBuilder {
    cfg: AgentConfig,
    host: Option<MemoryHost>,
}

impl AgentBuilder {
    pub fn config(mut self, cfg: AgentConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Host snapshot to load, as an element tree in JSON.
    pub fn fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.cfg.host.fixture = Some(path.into());
        self
    }

    /// Preference file. Without one, preferences live in memory only.
    pub fn store(mut self, path: impl Into<PathBuf>) -> Self {
        self.cfg.store.path = Some(path.into());
        self
    }

    /// Serves an already built host instead of loading a fixture.
    pub fn host(mut self, host: MemoryHost) -> Self {
        self.host = Some(host);
        self
    }

    /// Loads the host snapshot and opens the preference store.
    ///
    /// # Errors
    /// Returns an error if the fixture cannot be read or parsed, or the preference file
    /// cannot be opened.
    pub async fn build(self) -> Result<Agent> {
        let host = match (self.host, &self.cfg.host.fixture) {
            (Some(host), _) => host,
            (None, Some(path)) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read fixture {}", path.display()))?;
                let host = MemoryHost::from_json(&json)?;
                info!(fixture = %path.display(), elements = host.element_count(), "Host loaded");
                host
            },
            (None, None) => {
                warn!("No host fixture configured, serving an empty document");
                MemoryHost::new()
            },
        };
        host.finish_load();

        let store = match &self.cfg.store.path {
            Some(path) => AgentStore::File(FileStore::builder().path(path).open().await?),
            None => AgentStore::Memory(MemoryStore::new()),
        };

        Ok(Agent { cfg: self.cfg, host, store })
    }
}

#[derive(Debug)]
enum AgentStore {
    Memory(MemoryStore),
    File(FileStore),
}

#[derive(Debug)]
pub struct Agent {
    cfg: AgentConfig,
    host: MemoryHost,
    store: AgentStore,
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::default()
    }

    #[must_use]
    pub const fn host(&self) -> &MemoryHost {
        &self.host
    }

    /// Serves requests from `input` until it is exhausted or a shutdown signal arrives,
    /// then cleans every enhancement up.
    ///
    /// # Errors
    /// Returns an error if reading `input` or writing `output` fails, or the driver died.
    pub async fn run<R, W>(self, input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let Self { cfg, host, store } = self;
        match store {
            AgentStore::Memory(store) => serve(manager(host, store, &cfg), input, output).await,
            AgentStore::File(store) => serve(manager(host, store, &cfg), input, output).await,
        }
    }
}

fn manager<S: PreferenceStore>(
    host: MemoryHost,
    store: S,
    cfg: &AgentConfig,
) -> EnhancementManager<MemoryHost, S> {
    EnhancementManager::with_builtin(host, store, Arc::new(SystemClock), cfg.timing)
}

async fn serve<S, R, W>(
    manager: EnhancementManager<MemoryHost, S>,
    input: R,
    output: &mut W,
) -> Result<()>
where
    S: PreferenceStore + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (driver, handle) = Driver::new(manager, COMMAND_CAPACITY);
    let served = tokio::spawn(driver.run());
    info!("Agent serving requests");

    let mut lines = input.lines();
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read request")? else {
                    debug!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = match serde_json::from_str::<Value>(&line) {
                    Ok(message) => handle.request(message).await?,
                    Err(e) => Response::failure(
                        OverlayError::Protocol { message: e.to_string().into(), context: None }
                            .to_string(),
                    ),
                };
                write_response(output, &response).await?;
            },
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            },
        }
    }

    handle.shutdown().await?;
    served.await.context("Driver task failed")?;
    info!("Agent stopped");
    Ok(())
}

async fn write_response<W: AsyncWrite + Unpin>(output: &mut W, response: &Response) -> Result<()> {
    let mut line = serde_json::to_vec(response).context("Failed to encode response")?;
    line.push(b'\n');
    output.write_all(&line).await.context("Failed to write response")?;
    output.flush().await.context("Failed to flush response")?;
    Ok(())
}
