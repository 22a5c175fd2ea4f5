//! Tracing setup. The CLI logs to a file under the XDG state dir and drops to
//! stderr when that file cannot be opened.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "info,dlnotify=debug,dlnotify_core=debug";
const LOG_FILE_NAME: &str = "dlnotify.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Open (append) the log file inside `dir`, creating the directory if needed.
fn open_log_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("create log dir: {}", dir.display()))?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file: {}", path.display()))?;
    Ok((file, path))
}

/// Log to `~/.local/state/dlnotify/dlnotify.log`.
///
/// Errors leave no subscriber installed; callers fall back to
/// [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlnotify")?;
    let (file, path) = open_log_file(&xdg_dirs.get_state_home())?;

    // Events from concurrent tasks are serialized on the one handle.
    let writer = BoxMakeWriter::new(Mutex::new(file));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {e}"))?;

    tracing::info!(path = %path.display(), "dlnotify logging initialized");
    Ok(())
}

/// Stderr-only logging. A no-op if a subscriber is already installed.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
