//! Logger setup for binaries and demos.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the application.

use crate::config::LogConfig;
use crate::error::{EngineError, Result};
use std::fs::File;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter from `RUST_LOG`, falling back to the configured level
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| EngineError::ConfigError(format!("invalid log level {level:?}: {e}")))
}

/// Install the global subscriber.
///
/// With `config.file` set, logs go through a non-blocking writer to that
/// file and the returned guard must be kept alive until exit to flush it.
/// Otherwise logs go to stderr, which keeps them off a terminal display
/// drawing to stdout.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(&config.level)?;

    let (writer, guard) = match &config.file {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                EngineError::ConfigError(format!("could not open log file {}: {e}", path.display()))
            })?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let layer = if config.json {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer()
            .with_ansi(config.file.is_none())
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| EngineError::ConfigError(format!("logger already installed: {e}")))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(build_filter("info").is_ok());
        assert!(matches!(
            build_filter("glyph_engine=loud"),
            Err(EngineError::ConfigError(_))
        ));
    }
}
