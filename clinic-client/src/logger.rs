//! Logging Infrastructure

use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::ClientConfig;

/// Initialize the logger at `info`, writing text to stdout
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger from the client configuration
pub fn init_from_config(config: &ClientConfig) {
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
}

/// Initialize the logger with optional daily rolling file output.
///
/// `json_format` switches to one JSON object per line with the current span
/// attached. `RUST_LOG` takes precedence over `log_level`. Calling this twice
/// keeps the first subscriber.
pub fn init_logger_with_file(log_level: Option<&str>, json_format: bool, log_dir: Option<&Path>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_dir = log_dir.filter(|dir| dir.exists() || std::fs::create_dir_all(dir).is_ok());
    let writer = match file_dir {
        Some(dir) => BoxMakeWriter::new(tracing_appender::rolling::daily(dir, "clinic-console")),
        None => BoxMakeWriter::new(std::io::stdout),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(file_dir.is_none() && !json_format)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    let _ = if json_format {
        builder.with_target(true).json().with_current_span(true).try_init()
    } else {
        builder.with_target(false).try_init()
    };
}
