//! In-memory host: scripted permissions, recorded notifications and alarms,
//! and a map-backed key/value store.
//!
//! Used by tests and by `dlnotify replay --dry-run`, where nothing should touch
//! disk or a real notification surface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::{
    AlarmScheduler, HostError, KeyValueStorage, NotificationApi, NotificationOptions,
    PermissionApi,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Permission host with a fixed "already granted" answer and a fixed answer to prompts.
#[derive(Debug, Default)]
pub struct MemoryPermissions {
    granted: AtomicBool,
    grant_on_request: AtomicBool,
    fail_queries: AtomicBool,
    requests: AtomicUsize,
}

impl MemoryPermissions {
    pub fn new(granted: bool, grant_on_request: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
            grant_on_request: AtomicBool::new(grant_on_request),
            fail_queries: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        }
    }

    /// Make every `contains`/`request` call fail.
    pub fn set_failing(&self, failing: bool) {
        self.fail_queries.store(failing, Ordering::SeqCst);
    }

    pub fn set_grant_on_request(&self, grant: bool) {
        self.grant_on_request.store(grant, Ordering::SeqCst);
    }

    /// Simulate the user withdrawing the permission in browser settings.
    pub fn revoke(&self) {
        self.granted.store(false, Ordering::SeqCst);
    }

    /// Number of prompts shown so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionApi for MemoryPermissions {
    async fn contains(&self, _permission: &str) -> Result<bool, HostError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(HostError::rejected("permissions.contains failed"));
        }
        Ok(self.granted.load(Ordering::SeqCst))
    }

    async fn request(&self, _permission: &str) -> Result<bool, HostError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(HostError::rejected("permissions.request failed"));
        }
        let answer = self.grant_on_request.load(Ordering::SeqCst);
        if answer {
            self.granted.store(true, Ordering::SeqCst);
        }
        Ok(answer)
    }
}

/// Notification surface that records what would have been shown.
#[derive(Debug, Default)]
pub struct MemoryNotifications {
    shown: Mutex<Vec<NotificationOptions>>,
    failing: AtomicBool,
}

impl MemoryNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn shown(&self) -> Vec<NotificationOptions> {
        lock(&self.shown).clone()
    }

    /// Titles of shown notifications, oldest first.
    pub fn titles(&self) -> Vec<String> {
        lock(&self.shown).iter().map(|n| n.title.clone()).collect()
    }
}

#[async_trait]
impl NotificationApi for MemoryNotifications {
    async fn create(&self, options: NotificationOptions) -> Result<String, HostError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HostError::rejected("notifications.create failed"));
        }
        let mut shown = lock(&self.shown);
        shown.push(options);
        Ok(format!("notification-{}", shown.len()))
    }
}

/// Map-backed storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, serde_json::Value>>,
    failing: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Raw stored value for `key`, if any.
    pub fn raw(&self, key: &str) -> Option<serde_json::Value> {
        lock(&self.data).get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: serde_json::Value) {
        lock(&self.data).insert(key.to_string(), value);
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, serde_json::Value>, HostError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HostError::storage("storage.get failed"));
        }
        let data = lock(&self.data);
        Ok(keys
            .iter()
            .filter_map(|k| data.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: HashMap<String, serde_json::Value>) -> Result<(), HostError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HostError::storage("storage.set failed"));
        }
        lock(&self.data).extend(items);
        Ok(())
    }
}

/// Alarm scheduler that only records requests; tests fire alarms by hand.
#[derive(Debug, Default)]
pub struct RecordingAlarms {
    repeating: Mutex<Vec<(String, Duration)>>,
    once: Mutex<Vec<(String, Duration)>>,
}

impl RecordingAlarms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repeating(&self) -> Vec<(String, Duration)> {
        lock(&self.repeating).clone()
    }

    pub fn once(&self) -> Vec<(String, Duration)> {
        lock(&self.once).clone()
    }
}

#[async_trait]
impl AlarmScheduler for RecordingAlarms {
    async fn create_repeating(&self, name: &str, period: Duration) -> Result<(), HostError> {
        lock(&self.repeating).push((name.to_string(), period));
        Ok(())
    }

    async fn create_once(&self, name: &str, delay: Duration) -> Result<(), HostError> {
        lock(&self.once).push((name.to_string(), delay));
        Ok(())
    }
}
