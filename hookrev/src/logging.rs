//! File logging.
//!
//! The TUI owns stderr, so tracing output goes to
//! `$XDG_STATE_HOME/hookrev/hookrev.log` through a non-blocking writer.
//! The filter comes from `HOOKREV_LOG` (default `info`).

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use hookrev_core::config::xdg_dir;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "HOOKREV_LOG";
const LOG_FILE: &str = "hookrev.log";

/// Flushes buffered log lines when dropped; keep it alive until exit.
pub struct LogGuard {
    _guard: WorkerGuard,
}

pub fn log_path() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state").join("hookrev").join(LOG_FILE)
}

pub fn init() -> Result<LogGuard> {
    let path = log_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("installing the tracing subscriber")?;

    Ok(LogGuard { _guard: guard })
}
