use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tcard_agent::{Agent, init_logger};
use tcard_domain::config::AgentConfig;
use tcard_kernel::config::load_config;
use tokio::io::{BufReader, stdin, stdout};

/// Timecard overlay agent: newline-delimited JSON requests on stdin, responses on stdout.
#[derive(Debug, Parser)]
#[command(name = "tcard-agent", version, about)]
struct Args {
    /// Configuration file (TOML). `TCARD__*` environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host snapshot to serve.
    #[arg(short, long)]
    fixture: Option<PathBuf>,

    /// Preference file; in-memory when omitted.
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Log level, e.g. `debug`.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut cfg: AgentConfig =
        load_config(args.config.as_deref()).context("Critical: Configuration is malformed")?;
    if let Some(level) = args.log_level {
        cfg.logging.level = level;
    }
    let _log = init_logger(&cfg.logging)?;

    let mut builder = Agent::builder().config(cfg);
    if let Some(fixture) = args.fixture {
        builder = builder.fixture(fixture);
    }
    if let Some(store) = args.store {
        builder = builder.store(store);
    }

    builder.build().await?.run(BufReader::new(stdin()), &mut stdout()).await
}
