//! `dlnotify sweep` – drop stale and completed records from persisted state.

use anyhow::Result;
use dlnotify_core::config::DlnotifyConfig;

use super::build_tracker;

pub async fn run_sweep(cfg: &DlnotifyConfig) -> Result<()> {
    let (mut tracker, _fired) = build_tracker(cfg, false)?;
    tracker.hydrate().await;
    let removed = tracker.sweep().await;
    println!(
        "Removed {} record(s); {} remaining.",
        removed,
        tracker.store().len()
    );
    Ok(())
}
