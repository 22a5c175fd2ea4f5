//! Download state tracker.
//!
//! Consumes host download events and alarm ticks, keeps a bounded record of
//! recent downloads, and decides (through the global throttle) which events
//! raise a notification. Completed and failed downloads are removed twice
//! over: by a per-download one-shot alarm and by the periodic sweep, so a lost
//! alarm (e.g. after a restart) never leaks records.
//!
//! All state lives in the tracker instance. It is written through to the host
//! key/value store after every mutation and read back once on startup.

mod alarm;
mod events;
mod record;
mod snapshot;
mod store;
mod throttle;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::host::{
    AlarmScheduler, Clock, KeyValueStorage, NotificationOptions, NOTIFICATIONS_PERMISSION,
};
use crate::permission::{NotifyOutcome, PermissionGate};

pub use alarm::{removal_alarm, AlarmKind, SWEEP_ALARM};
pub use events::{DownloadDelta, DownloadItem, DownloadState, PermissionsDelta, StateChange};
pub use record::{display_name, DownloadId, DownloadRecord, UNKNOWN_FILENAME};
pub use snapshot::{PersistedState, DOWNLOADS_KEY, LAST_NOTIFICATION_KEY};
pub use store::DownloadStore;
pub use throttle::Throttle;

pub const TITLE_STARTED: &str = "Download Started";
pub const TITLE_COMPLETED: &str = "Download Completed";
pub const TITLE_FAILED: &str = "Download Failed";

/// Tracker limits and timings.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Minimum spacing between notification attempts.
    pub throttle_interval: Duration,
    /// Maximum number of tracked downloads.
    pub capacity: usize,
    /// Period of the sweep alarm.
    pub sweep_interval: Duration,
    /// Records older than this are swept even if not completed.
    pub retention: Duration,
    /// Delay before a completed download's record is removed.
    pub completed_removal_delay: Duration,
    /// Delay before a failed download's record is removed.
    pub failed_removal_delay: Duration,
    /// Whether a created event that loses the throttle is still recorded.
    pub record_when_throttled: bool,
    pub icon_url: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            throttle_interval: Duration::from_millis(1000),
            capacity: 100,
            sweep_interval: Duration::from_secs(5 * 60),
            retention: Duration::from_secs(24 * 60 * 60),
            completed_removal_delay: Duration::from_secs(60),
            failed_removal_delay: Duration::from_secs(5),
            record_when_throttled: true,
            icon_url: "icons/icon-48.png".to_string(),
        }
    }
}

/// Read-only view for status output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackerStats {
    pub active_downloads: usize,
    pub last_notification: Option<DateTime<Utc>>,
    pub has_notification_permission: bool,
}

pub struct DownloadTracker {
    config: TrackerConfig,
    gate: PermissionGate,
    store: DownloadStore,
    throttle: Throttle,
    storage: Arc<dyn KeyValueStorage>,
    alarms: Arc<dyn AlarmScheduler>,
    clock: Arc<dyn Clock>,
}

impl DownloadTracker {
    pub fn new(
        config: TrackerConfig,
        gate: PermissionGate,
        storage: Arc<dyn KeyValueStorage>,
        alarms: Arc<dyn AlarmScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: DownloadStore::new(config.capacity),
            throttle: Throttle::new(config.throttle_interval),
            config,
            gate,
            storage,
            alarms,
            clock,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &DownloadStore {
        &self.store
    }

    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut PermissionGate {
        &mut self.gate
    }

    /// Startup sequence: sync permission, load persisted state, arm the sweep
    /// alarm, and sweep once to drop anything a lost alarm left behind.
    pub async fn initialize(&mut self) {
        self.gate.check_permission().await;
        self.hydrate().await;
        if let Err(e) = self
            .alarms
            .create_repeating(SWEEP_ALARM, self.config.sweep_interval)
            .await
        {
            tracing::warn!("failed to create sweep alarm: {}", e);
        }
        self.sweep().await;
    }

    /// Replace in-memory state with the persisted snapshot. Unreadable state
    /// leaves the tracker empty.
    pub async fn hydrate(&mut self) {
        let loaded = self
            .storage
            .get(&[DOWNLOADS_KEY, LAST_NOTIFICATION_KEY])
            .await
            .and_then(PersistedState::from_items);
        self.store = DownloadStore::new(self.config.capacity);
        self.throttle = Throttle::new(self.config.throttle_interval);
        match loaded {
            Ok(state) => {
                state.restore(&mut self.store, &mut self.throttle);
                tracing::debug!(downloads = self.store.len(), "restored tracker state");
            }
            Err(e) => tracing::error!("error loading tracker state, starting empty: {}", e),
        }
    }

    async fn persist(&self) {
        let items = match PersistedState::capture(&self.store, &self.throttle).to_items() {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("error serializing tracker state: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(items).await {
            tracing::error!("error saving tracker state: {}", e);
        }
    }

    async fn notify(&mut self, title: &str, message: String) -> NotifyOutcome {
        let options = NotificationOptions::basic(self.config.icon_url.clone(), title, message);
        self.gate.attempt_notify(options).await
    }

    async fn schedule_removal(&self, id: DownloadId, delay: Duration) {
        if let Err(e) = self.alarms.create_once(&removal_alarm(id), delay).await {
            tracing::warn!(id, "failed to schedule record removal: {}", e);
        }
    }

    pub async fn on_download_created(&mut self, item: &DownloadItem) {
        let now = self.clock.now_ms();
        let approved = self.throttle.try_acquire(now);
        if !approved && !self.config.record_when_throttled {
            tracing::debug!(id = item.id, "download created while throttled; not recorded");
            return;
        }

        let record = DownloadRecord::new(item.filename.as_deref(), now);
        let filename = record.filename.clone();
        let evicted = self.store.insert(item.id, record);
        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), "evicted oldest download records");
        }
        self.persist().await;
        tracing::debug!(id = item.id, filename = %filename, notify = approved, "download created");

        if approved {
            self.notify(TITLE_STARTED, filename).await;
        }
    }

    pub async fn on_download_changed(&mut self, delta: &DownloadDelta) {
        let Some(state) = delta.current_state().filter(|s| s.is_terminal()) else {
            return;
        };
        let Some(record) = self.store.get(delta.id) else {
            return;
        };
        if record.completed {
            tracing::debug!(id = delta.id, ?state, "terminal state already recorded");
            return;
        }
        let filename = record.filename.clone();

        let approved = self.throttle.try_acquire(self.clock.now_ms());
        let (title, message, delay) = match state {
            DownloadState::Complete => (
                TITLE_COMPLETED,
                filename.clone(),
                self.config.completed_removal_delay,
            ),
            _ => (
                TITLE_FAILED,
                format!("{filename} - Download interrupted"),
                self.config.failed_removal_delay,
            ),
        };
        if approved {
            self.notify(title, message).await;
        }

        if let Some(record) = self.store.get_mut(delta.id) {
            record.completed = true;
        }
        self.persist().await;
        self.schedule_removal(delta.id, delay).await;
        tracing::debug!(id = delta.id, ?state, filename = %filename, "download finished");
    }

    /// The user cleared the download from the host's history.
    pub async fn on_download_erased(&mut self, id: DownloadId) {
        self.remove_download(id).await;
    }

    pub fn on_permissions_removed(&mut self, delta: &PermissionsDelta) {
        if delta.includes(NOTIFICATIONS_PERMISSION) {
            self.gate.on_permission_revoked();
        }
    }

    pub async fn on_alarm(&mut self, name: &str) {
        match AlarmKind::parse(name) {
            AlarmKind::Sweep => {
                self.sweep().await;
            }
            AlarmKind::Remove(id) => {
                self.remove_download(id).await;
            }
            AlarmKind::Unknown => tracing::debug!(alarm = name, "ignoring unknown alarm"),
        }
    }

    /// Remove one record; true if it was present.
    pub async fn remove_download(&mut self, id: DownloadId) -> bool {
        if self.store.remove(id).is_none() {
            return false;
        }
        self.persist().await;
        true
    }

    /// Drop records past retention and completed records. Returns the count removed.
    pub async fn sweep(&mut self) -> usize {
        let retention_ms = i64::try_from(self.config.retention.as_millis()).unwrap_or(i64::MAX);
        let cutoff = self.clock.now_ms().saturating_sub(retention_ms);
        let removed = self
            .store
            .remove_where(|r| r.created_at < cutoff || r.completed);
        if removed > 0 {
            tracing::info!(removed, remaining = self.store.len(), "swept download records");
        }
        self.persist().await;
        removed
    }

    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            active_downloads: self.store.len(),
            last_notification: self
                .throttle
                .last_notification_at()
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            has_notification_permission: self.gate.is_granted(),
        }
    }
}
