use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::LogConfig;

/// Failures while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log file could not be opened for appending.
    #[error("failed to open log file {path}: {source}")]
    OpenLogFile {
        /// Requested path.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The verbosity-derived directive did not parse.
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] ParseError),
    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Installs a subscriber honouring `RUST_LOG`, falling back to the
/// directive implied by the configured verbosity.
pub fn init_tracing(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.default_directive())?,
    };
    init_tracing_with_filter(config, filter)
}

/// Installs a subscriber with an explicit filter layer.
pub fn init_tracing_with_filter<F>(config: &LogConfig, filter: F) -> Result<(), LoggingError>
where
    F: Layer<Registry> + Send + Sync + 'static,
{
    let file_layer = match &config.log_file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_thread_names(true)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };
    let stderr_layer = config.log_file.is_none().then(|| {
        tracing_subscriber::fmt::layer()
            .with_thread_names(true)
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenLogFile {
            path: path.to_path_buf(),
            source,
        })
}
