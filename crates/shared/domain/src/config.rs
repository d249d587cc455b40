use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level agent configuration. Every section falls back to its defaults.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub timing: TimingConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub host: HostConfig,
}

/// Debounce and settle intervals, in milliseconds.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    /// Quiet window after the last structural change before a reactive pass.
    pub quiet_window_ms: u64,
    /// One-shot delay after the host's load event.
    pub load_delay_ms: u64,
    /// Pause before a shading coordination pass.
    pub settle_delay_ms: u64,
    /// Pause before re-applying a freshly enabled enhancement.
    pub refresh_delay_ms: u64,
}

/// Preference store backend. No path means an in-memory store.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub directory: Option<PathBuf>,
    pub filter: Option<String>,
}

/// Where the host view snapshot is loaded from.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub fixture: Option<PathBuf>,
}

impl TimingConfig {
    #[must_use]
    pub const fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.quiet_window_ms)
    }

    #[must_use]
    pub const fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub const fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

// --- Default ---

impl Default for TimingConfig {
    fn default() -> Self {
        Self { quiet_window_ms: 250, load_delay_ms: 500, settle_delay_ms: 150, refresh_delay_ms: 100 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: false, directory: None, filter: None }
    }
}
