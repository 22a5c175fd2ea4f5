//! Subcommand implementations.

mod replay;
mod stats;
mod sweep;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use dlnotify_core::config::DlnotifyConfig;
use dlnotify_core::host::desktop::{ConfigPermissions, LogNotifier, TokioAlarms};
use dlnotify_core::host::file_storage::FileStorage;
use dlnotify_core::host::memory::MemoryStorage;
use dlnotify_core::host::{KeyValueStorage, SystemClock};
use dlnotify_core::permission::PermissionGate;
use dlnotify_core::tracker::DownloadTracker;
use tokio::sync::mpsc;

pub use replay::{run_replay, ReplayOptions};
pub use stats::run_stats;
pub use sweep::run_sweep;

fn state_path(cfg: &DlnotifyConfig) -> Result<PathBuf> {
    match &cfg.state_path {
        Some(path) => Ok(path.clone()),
        None => FileStorage::default_path(),
    }
}

/// Tracker over the desktop host. Returns the receiver for fired alarm names.
pub(crate) fn build_tracker(
    cfg: &DlnotifyConfig,
    dry_run: bool,
) -> Result<(DownloadTracker, mpsc::UnboundedReceiver<String>)> {
    let storage: Arc<dyn KeyValueStorage> = if dry_run {
        Arc::new(MemoryStorage::new())
    } else {
        let path = state_path(cfg)?;
        tracing::debug!(path = %path.display(), "using state file");
        Arc::new(FileStorage::new(path))
    };
    let (alarms, fired) = TokioAlarms::new();
    let gate = PermissionGate::new(
        Arc::new(ConfigPermissions::new(cfg.notifications_granted)),
        Arc::new(LogNotifier::new(cfg.print_notifications)),
    );
    let tracker = DownloadTracker::new(
        cfg.tracker_config(),
        gate,
        storage,
        Arc::new(alarms),
        Arc::new(SystemClock),
    );
    Ok((tracker, fired))
}
