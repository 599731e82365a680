//! Tracing setup: stderr plus a plain-text log file per run

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::organizer::job::run_id_for;

const APP_DIR: &str = "pdf-organizer";

/// `<data-local-dir>/pdf-organizer/logs/run-<timestamp>.log`
pub fn default_log_path(started_at: &DateTime<Utc>) -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| {
        dir.join(APP_DIR)
            .join("logs")
            .join(format!("{}.log", run_id_for(started_at)))
    })
}

/// Filter directives: `RUST_LOG` wins, otherwise `level` for this crate and
/// `warn` for dependencies
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pdf_organizer_lib={}", level)))
}

/// Install the global subscriber.
///
/// Returns the log file actually in use; `None` if it could not be created
/// (logging goes to stderr only) or if a subscriber was already installed.
/// Safe to call more than once: later calls leave the first subscriber in
/// place.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Option<PathBuf> {
    let log_path = log_file
        .map(Path::to_path_buf)
        .or_else(|| default_log_path(&Utc::now()));

    let file = log_path.as_ref().and_then(|path| match open_log_file(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Could not open log file {}: {}", path.display(), e);
            None
        }
    });
    let log_path = if file.is_some() { log_path } else { None };

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let file_layer = file.map(|f| {
        fmt::layer()
            .with_writer(Mutex::new(f))
            .with_ansi(false)
            .with_target(false)
    });

    let result = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if result.is_err() {
        // A subscriber is already installed; nothing writes to the new file
        if let Some(path) = &log_path {
            let _ = fs::remove_file(path);
        }
        return None;
    }

    if let Some(path) = &log_path {
        tracing::debug!("[Logging] Writing log to {}", path.display());
    }
    log_path
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    File::create(path)
}
