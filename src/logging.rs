// src/logging.rs

//! Tracing subscriber setup.
//!
//! INFO and below go to stdout, WARN and ERROR go to stderr. `RUST_LOG`
//! takes precedence over the configured level.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::{fmt::writer::MakeWriterExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

pub fn init(cfg: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .map_err(|e| anyhow!("Invalid log level {:?}: {}", cfg.level, e))?;

    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    let installed = match cfg.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}
