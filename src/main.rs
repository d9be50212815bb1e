//! Sensorlog collector and query console
//!
//! Run with: cargo run -- <config file> [collect|query|all]
//!
//! The config path falls back to SENSORLOG_CONFIG when no argument is given.
//!
//! Modes:
//! - collect: connect to the producer and store one collection run
//! - query: open a previously stored run and start the query console
//! - all (default): collect, then query the run just stored
//!
//! Environment variables:
//! - SENSORLOG_HOST, SENSORLOG_PORT, SENSORLOG_OUTPUT_DIR,
//!   SENSORLOG_RECORD_WINDOW_MS: override the config file
//! - SENSORLOG_FORMAT: `json` for JSON query output (default: text)
//! - RUST_LOG: Log level (default: info)

use std::io;

use sensorlog::cli::{Cli, OutputFormat};
use sensorlog::config::{Config, CONFIG_PATH_ENV};
use sensorlog::ingest::{Ingestor, TcpFrameSource};
use sensorlog::query::QueryEngine;
use sensorlog::storage::BucketStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Collect,
    Query,
    All,
}

impl Mode {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw {
            None | Some("all") => Some(Mode::All),
            Some("collect") => Some(Mode::Collect),
            Some("query") => Some(Mode::Query),
            Some(_) => None,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with console output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensorlog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = match args.get(1) {
        Some(path) => path.clone(),
        None => std::env::var(CONFIG_PATH_ENV)
            .map_err(|_| "usage: sensorlog <config file> [collect|query|all]")?,
    };
    let mode_arg = args.get(2).map(String::as_str);
    let mode = Mode::parse(mode_arg)
        .ok_or_else(|| format!("unknown mode '{}'", mode_arg.unwrap_or_default()))?;

    let config = Config::load(&config_path)?;

    tracing::info!("Sensorlog configuration:");
    tracing::info!("  Producer: {}", config.producer_addr());
    tracing::info!("  Output dir: {}", config.output_dir.display());
    tracing::info!("  Schema: {}", config.schema);
    tracing::info!("  Record window: {} ms", config.record_window_ms);

    let store = BucketStore::open(&config.output_dir)?;

    let mut engine = match mode {
        Mode::Query => QueryEngine::open(store, config.record_window_ms)?,
        Mode::Collect | Mode::All => {
            let mut source = TcpFrameSource::connect(config.producer_addr(), config.schema.clone())?;
            let report = Ingestor::new(store.clone(), config.schema.clone())
                .with_record_window(config.record_window_ms)
                .run(&mut source)?;

            if report.stopped_by_window {
                tracing::info!("Record window closed after {} records", report.stats.count);
            } else {
                tracing::info!("Producer closed the stream after {} records", report.stats.count);
            }

            if mode == Mode::Collect {
                return Ok(());
            }

            match report.bucketer() {
                Some(bucketer) => QueryEngine::new(store, bucketer, config.schema.clone()),
                None => {
                    tracing::warn!("No frames received, nothing to query");
                    return Ok(());
                }
            }
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    Cli::new(&mut engine, stdin.lock(), stdout.lock())
        .with_format(OutputFormat::from_env())
        .run()?;

    Ok(())
}
