//! File-based logging setup
//!
//! Writes logs to logs/stream.log (daily rotation) alongside console output.
//! Per-frame drops are logged at warn/debug by the stream loop; nothing on
//! the receive path logs at info or above during normal operation.

use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize console and file logging
///
/// Returns a WorkerGuard which must be kept alive for the duration of the
/// program, or buffered log lines are lost on exit.
pub fn init_logging() -> WorkerGuard {
    let logs_dir = Path::new("logs");
    if !logs_dir.exists() {
        fs::create_dir_all(logs_dir).expect("Failed to create logs directory");
    }

    let appender = RollingFileAppender::new(Rotation::DAILY, "logs", "stream");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("Logging initialized, files under logs/");

    guard
}
