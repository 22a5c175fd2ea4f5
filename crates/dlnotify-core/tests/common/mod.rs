//! Shared setup: a tracker wired to the in-memory host and tokio alarms.

use std::sync::Arc;

use dlnotify_core::host::clock::ManualClock;
use dlnotify_core::host::desktop::TokioAlarms;
use dlnotify_core::host::memory::{MemoryNotifications, MemoryPermissions, MemoryStorage};
use dlnotify_core::permission::PermissionGate;
use dlnotify_core::service::{BackgroundService, ServiceHandle};
use dlnotify_core::tracker::{DownloadTracker, TrackerConfig};

pub struct TestHost {
    pub clock: Arc<ManualClock>,
    pub perms: Arc<MemoryPermissions>,
    pub notes: Arc<MemoryNotifications>,
    pub storage: Arc<MemoryStorage>,
}

impl TestHost {
    pub fn new(granted: bool) -> Self {
        Self {
            clock: Arc::new(ManualClock::new(1_700_000_000_000)),
            perms: Arc::new(MemoryPermissions::new(granted, granted)),
            notes: Arc::new(MemoryNotifications::new()),
            storage: Arc::new(MemoryStorage::new()),
        }
    }

    /// Spawn a service over this host. Must be called inside a tokio runtime.
    pub fn spawn(&self) -> ServiceHandle {
        let (alarms, fired) = TokioAlarms::new();
        let gate = PermissionGate::new(self.perms.clone(), self.notes.clone());
        let tracker = DownloadTracker::new(
            TrackerConfig::default(),
            gate,
            self.storage.clone(),
            Arc::new(alarms),
            self.clock.clone(),
        );
        BackgroundService::new(tracker, Some(fired)).spawn()
    }
}
