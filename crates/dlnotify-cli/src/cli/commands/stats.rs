//! `dlnotify stats` – summary of persisted tracker state.

use anyhow::{Context, Result};
use dlnotify_core::config::DlnotifyConfig;

use super::build_tracker;

pub async fn run_stats(cfg: &DlnotifyConfig, json: bool) -> Result<()> {
    let (mut tracker, _fired) = build_tracker(cfg, false)?;
    tracker.hydrate().await;
    tracker.gate_mut().check_permission().await;
    let stats = tracker.stats();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("serialize stats")?
        );
        return Ok(());
    }

    let last = stats
        .last_notification
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());
    println!("{:<24} {}", "ACTIVE DOWNLOADS", stats.active_downloads);
    println!("{:<24} {}", "LAST NOTIFICATION", last);
    println!(
        "{:<24} {}",
        "NOTIFICATIONS",
        if stats.has_notification_permission {
            "granted"
        } else {
            "not granted"
        }
    );
    if !tracker.store().is_empty() {
        println!();
        println!("{:<10} {:<10} {}", "ID", "STATE", "FILENAME");
        for (id, record) in tracker.store().iter() {
            let state = if record.completed { "finished" } else { "active" };
            println!("{:<10} {:<10} {}", id, state, record.filename);
        }
    }
    Ok(())
}
