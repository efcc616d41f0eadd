//! Structured logging setup shared by both binaries.
//!
//! Events are formatted as JSON and filtered with `RUST_LOG`. Writes go
//! through `tracing-appender` non-blocking writers; the returned
//! [`TelemetryGuard`] owns their flush threads and must live until exit.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

/// Keeps the log writers alive. Dropping it flushes pending lines.
#[must_use = "dropping the guard stops log delivery"]
pub struct TelemetryGuard {
    _stdout: WorkerGuard,
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber for `service`.
///
/// When `log_dir` is given, a daily-rotated `<service>.log` is written there
/// in addition to stdout.
///
/// # Errors
/// Fails when a global subscriber is already installed.
pub fn init(
    service: &str,
    log_dir: Option<&Path>,
) -> Result<TelemetryGuard, tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, format!("{service}.log"));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(stdout))
        .with(file_layer)
        .try_init()?;

    Ok(TelemetryGuard {
        _stdout: stdout_guard,
        _file: file_guard,
    })
}
