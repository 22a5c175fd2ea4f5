//! Serializable snapshot of tracker state and conversion to/from storage items.
//!
//! Layout in the host store:
//! - `downloads`: array of `[id, {filename, timestamp, completed}]`, oldest first
//! - `lastNotificationTime`: ms since the Unix epoch, 0 when never notified

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::host::HostError;

use super::record::{DownloadId, DownloadRecord};
use super::store::DownloadStore;
use super::throttle::Throttle;

pub const DOWNLOADS_KEY: &str = "downloads";
pub const LAST_NOTIFICATION_KEY: &str = "lastNotificationTime";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub downloads: Vec<(DownloadId, DownloadRecord)>,
    pub last_notification_time: i64,
}

impl PersistedState {
    pub(super) fn capture(store: &DownloadStore, throttle: &Throttle) -> Self {
        Self {
            downloads: store.iter().map(|(id, r)| (id, r.clone())).collect(),
            last_notification_time: throttle.last_notification_at().unwrap_or(0),
        }
    }

    /// Rebuild in-memory state. Capacity comes from config, so an oversized
    /// snapshot is trimmed on load.
    pub(super) fn restore(self, store: &mut DownloadStore, throttle: &mut Throttle) {
        for (id, record) in self.downloads {
            store.push_restored(id, record);
        }
        store.enforce_capacity();
        throttle.restore((self.last_notification_time > 0).then_some(self.last_notification_time));
    }

    pub fn to_items(&self) -> Result<HashMap<String, serde_json::Value>, HostError> {
        let mut items = HashMap::new();
        items.insert(DOWNLOADS_KEY.to_string(), serde_json::to_value(&self.downloads)?);
        items.insert(
            LAST_NOTIFICATION_KEY.to_string(),
            serde_json::Value::from(self.last_notification_time),
        );
        Ok(items)
    }

    /// Missing keys fall back to empty/zero, like a fresh install.
    pub fn from_items(mut items: HashMap<String, serde_json::Value>) -> Result<Self, HostError> {
        let downloads = match items.remove(DOWNLOADS_KEY) {
            Some(serde_json::Value::Null) | None => Vec::new(),
            Some(v) => serde_json::from_value(v)?,
        };
        let last_notification_time = items
            .remove(LAST_NOTIFICATION_KEY)
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        Ok(Self {
            downloads,
            last_notification_time,
        })
    }
}
