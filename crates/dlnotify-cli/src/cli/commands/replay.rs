//! `dlnotify replay` – drive the background service from a JSON-lines event file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dlnotify_core::config::DlnotifyConfig;
use dlnotify_core::service::{BackgroundService, HostEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::build_tracker;

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub path: PathBuf,
    pub interval_ms: u64,
    pub linger_secs: u64,
    pub dry_run: bool,
}

/// Parse one line. Blank lines and `#` comments yield `None`; so do lines
/// that are not a valid event, which are logged and skipped.
fn parse_event_line(line_no: usize, line: &str) -> Option<HostEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(line = line_no, "skipping malformed event: {}", e);
            None
        }
    }
}

async fn read_events_from<R: AsyncBufRead + Unpin>(reader: R) -> Result<Vec<HostEvent>> {
    let mut lines = reader.lines();
    let mut events = Vec::new();
    let mut line_no = 0;
    while let Some(line) = lines.next_line().await.context("read event line")? {
        line_no += 1;
        if let Some(event) = parse_event_line(line_no, &line) {
            events.push(event);
        }
    }
    Ok(events)
}

async fn read_events(path: &Path) -> Result<Vec<HostEvent>> {
    if path == Path::new("-") {
        return read_events_from(BufReader::new(tokio::io::stdin())).await;
    }
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("open event file: {}", path.display()))?;
    read_events_from(BufReader::new(file)).await
}

pub async fn run_replay(cfg: &DlnotifyConfig, opts: &ReplayOptions) -> Result<()> {
    let events = read_events(&opts.path).await?;
    tracing::info!(count = events.len(), dry_run = opts.dry_run, "replaying events");

    let (tracker, fired) = build_tracker(cfg, opts.dry_run)?;
    let handle = BackgroundService::new(tracker, Some(fired)).spawn();

    for (i, event) in events.into_iter().enumerate() {
        if i > 0 && opts.interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(opts.interval_ms)).await;
        }
        handle.send(event).await?;
    }

    if opts.linger_secs > 0 {
        tracing::info!(secs = opts.linger_secs, "waiting for pending alarms");
        tokio::time::sleep(Duration::from_secs(opts.linger_secs)).await;
    }

    let stats = handle.stats().await;
    handle.shutdown().await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).context("serialize stats")?
    );
    Ok(())
}
