//! Tracing subscriber setup.
//!
//! Diagnostics always go to stderr so stdout carries only the conversation.

use crate::config::LogConfig;
use crate::error::{HearthError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when neither `RUST_LOG` nor `logging.filter` is set.
pub const DEFAULT_FILTER: &str = "hearth=info,hearth_search=info";

/// Resolve the filter directives: `RUST_LOG`, then the config, then
/// [`DEFAULT_FILTER`].
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = config.filter.as_deref().unwrap_or(DEFAULT_FILTER);
        EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    })
}

/// Install the global subscriber.
///
/// When `config.file` is set, a second non-blocking writer appends plain
/// text to that file. The returned guard must be held until exit or
/// buffered lines are lost.
///
/// # Errors
///
/// Returns an error if the log file's directory cannot be created or a
/// global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match config.file.as_deref() {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            std::fs::create_dir_all(dir)?;
            let name = path
                .file_name()
                .ok_or_else(|| HearthError::Config(format!("invalid log file {path:?}")))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| HearthError::Config(format!("logging already initialised: {e}")))?;

    Ok(guard)
}
