//! Structured logging for the NER service.
//!
//! Logging is built on `tracing`. The configured level is the default
//! directive; `RUST_LOG` overrides it when set. Output can go to stdout, to a
//! file through a non-blocking appender, or both.

#[cfg(feature = "http")]
pub mod middleware;

#[cfg(feature = "http")]
pub use middleware::trace_requests;

use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Layer, fmt, fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Error type for logging operations
#[derive(Debug, Error)]
pub enum LogError {
    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing log level
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    /// Error in subscriber setup
    #[error("Subscriber error: {0}")]
    SubscriberError(String),
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Initialize the global subscriber with the given configuration.
///
/// Returns the appender guard when logging to a file; keep it alive for as
/// long as logs should be flushed. Calling this after a global subscriber is
/// already installed is a no-op.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    if tracing::dispatcher::has_been_set() {
        return Ok(None);
    }

    let filter = build_filter(config.level);

    let stdout_layer = config
        .stdout
        .then(|| format_layer(config.format, std::io::stdout, true));

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let (writer, guard) = create_non_blocking_file(path)?;
            (Some(format_layer(config.format, writer, false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LogError::SubscriberError(e.to_string()))?;

    Ok(guard)
}

/// `RUST_LOG` when present, the configured level otherwise.
fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

fn format_layer<S, W>(
    format: LogFormat,
    writer: W,
    ansi: bool,
) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_level(true)
        .with_target(true)
        .with_line_number(true)
        .with_thread_ids(true);

    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Default => layer.boxed(),
    }
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<(NonBlocking, WorkerGuard)> {
    let path = path.as_ref();

    let file_name = path.file_name().ok_or_else(|| {
        LogError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("log file path has no file name: {}", path.display()),
        ))
    })?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(file_appender))
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(LogLevel::Trace),
        "debug" => Ok(LogLevel::Debug),
        "info" => Ok(LogLevel::Info),
        "warn" | "warning" => Ok(LogLevel::Warn),
        "error" => Ok(LogLevel::Error),
        _ => Err(LogError::InvalidLogLevel(level.to_string())),
    }
}
