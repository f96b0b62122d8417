//! Tracing subscriber setup for applications embedding filekit.
//!
//! filekit itself only emits `tracing` events. These helpers install a
//! global subscriber for them and fail with [`FileKitError::Config`] instead
//! of panicking when the host application already installed one.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LoggingConfig};
use crate::{FileKitError, Result};

pub(crate) fn parse_level(level: &str) -> Result<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "" | "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(FileKitError::Config(format!("unknown log level: {other}"))),
    }
}

/// Where events go: stdout, plus the log file when one is configured.
///
/// The file is appended to and its parent directories are created.
fn make_writer(logging: &LoggingConfig) -> Result<BoxMakeWriter> {
    if logging.file.is_empty() {
        return Ok(BoxMakeWriter::new(io::stdout));
    }

    let path = Path::new(&logging.file);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BoxMakeWriter::new(io::stdout.and(Arc::new(file))))
}

/// Install the global subscriber described by `config.logging`.
///
/// `RUST_LOG` directives are honored on top of the configured level.
pub fn init(config: &Config) -> Result<()> {
    let logging = &config.logging;
    let level = parse_level(&logging.level)?;
    let writer = make_writer(logging)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(logging.file.is_empty())
                .with_target(true),
        )
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| FileKitError::Config(format!("cannot install logger: {e}")))
}

/// Console-only logging at `level`.
pub fn init_console(level: &str) -> Result<()> {
    let config = Config {
        logging: LoggingConfig {
            level: level.to_string(),
            file: String::new(),
        },
        ..Config::default()
    };
    init(&config)
}
