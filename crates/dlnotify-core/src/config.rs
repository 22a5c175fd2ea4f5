use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::tracker::TrackerConfig;

/// Global configuration loaded from `~/.config/dlnotify/config.toml`.
///
/// Throttle, capacity and cleanup timings are fixed and deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlnotifyConfig {
    /// Icon shown with every notification.
    pub icon_url: String,
    /// Answer the desktop host gives to notification permission queries.
    pub notifications_granted: bool,
    /// Also print notifications to stdout (besides the log).
    #[serde(default = "default_print_notifications")]
    pub print_notifications: bool,
    /// Record downloads whose creation lost the notification throttle.
    #[serde(default = "default_record_when_throttled")]
    pub record_when_throttled: bool,
    /// Optional override for the persisted state file.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

fn default_print_notifications() -> bool {
    true
}

fn default_record_when_throttled() -> bool {
    true
}

impl Default for DlnotifyConfig {
    fn default() -> Self {
        Self {
            icon_url: "icons/icon-48.png".to_string(),
            notifications_granted: true,
            print_notifications: true,
            record_when_throttled: true,
            state_path: None,
        }
    }
}

impl DlnotifyConfig {
    /// Tracker settings: fixed limits plus the configurable bits.
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            icon_url: self.icon_url.clone(),
            record_when_throttled: self.record_when_throttled,
            ..TrackerConfig::default()
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlnotify")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DlnotifyConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DlnotifyConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(&path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: DlnotifyConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_config_values() {
        let cfg = DlnotifyConfig::default();
        assert_eq!(cfg.icon_url, "icons/icon-48.png");
        assert!(cfg.notifications_granted);
        assert!(cfg.print_notifications);
        assert!(cfg.record_when_throttled);
        assert!(cfg.state_path.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = DlnotifyConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DlnotifyConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.icon_url, cfg.icon_url);
        assert_eq!(parsed.notifications_granted, cfg.notifications_granted);
        assert_eq!(parsed.print_notifications, cfg.print_notifications);
    }

    #[test]
    fn config_toml_minimal_uses_defaults() {
        let toml = r#"
            icon_url = "file:///usr/share/icons/dl.png"
            notifications_granted = false
        "#;
        let cfg: DlnotifyConfig = toml::from_str(toml).unwrap();
        assert!(!cfg.notifications_granted);
        assert!(cfg.print_notifications);
        assert!(cfg.record_when_throttled);
        assert!(cfg.state_path.is_none());
    }

    #[test]
    fn tracker_config_keeps_fixed_limits() {
        let toml = r#"
            icon_url = "x.png"
            notifications_granted = true
            record_when_throttled = false
            state_path = "/tmp/dlnotify-state.json"
        "#;
        let cfg: DlnotifyConfig = toml::from_str(toml).unwrap();
        let tc = cfg.tracker_config();
        assert_eq!(tc.icon_url, "x.png");
        assert!(!tc.record_when_throttled);
        assert_eq!(tc.capacity, 100);
        assert_eq!(tc.throttle_interval, Duration::from_millis(1000));
        assert_eq!(tc.sweep_interval, Duration::from_secs(300));
        assert_eq!(tc.retention, Duration::from_secs(86_400));
        assert_eq!(tc.completed_removal_delay, Duration::from_secs(60));
        assert_eq!(tc.failed_removal_delay, Duration::from_secs(5));
        assert_eq!(cfg.state_path, Some(PathBuf::from("/tmp/dlnotify-state.json")));
    }
}
