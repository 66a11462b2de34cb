//! Logging Infrastructure
//!
//! Structured logging setup for both development and production.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger from RUST_LOG / defaults
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional daily rolling file output
///
/// `RUST_LOG` takes precedence over `log_level` when set. When `log_dir`
/// points at an existing directory, output goes to a daily rolling file
/// there instead of stdout.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "galley-server");
            subscriber.with_writer(file_appender).with_ansi(false).init();
            return;
        }
        eprintln!("LOG_DIR '{dir}' does not exist, logging to stdout");
    }

    subscriber.init();
}
