//! Host capabilities consumed by the tracker and the permission gatekeeper.
//!
//! The browser (or whatever embeds us) owns downloads, notifications,
//! permissions, storage and alarms. We only see them through these traits so
//! that the policy code can run against the in-memory fakes in [`memory`] or
//! the file/timer backed [`desktop`] host.

pub mod clock;
pub mod desktop;
mod error;
pub mod file_storage;
pub mod memory;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use clock::{Clock, SystemClock};
pub use error::HostError;

/// Name of the permission that gates notifications.
pub const NOTIFICATIONS_PERMISSION: &str = "notifications";

/// Options passed to the host notification surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    #[serde(rename = "type")]
    pub kind: String,
    pub icon_url: String,
    pub title: String,
    pub message: String,
}

impl NotificationOptions {
    /// A "basic" notification, the only kind we raise.
    pub fn basic(icon_url: impl Into<String>, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: "basic".to_string(),
            icon_url: icon_url.into(),
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Permission query/request for a named capability.
#[async_trait]
pub trait PermissionApi: Send + Sync {
    /// Whether `permission` is currently granted.
    async fn contains(&self, permission: &str) -> Result<bool, HostError>;

    /// Prompt for `permission`; returns the user's answer.
    async fn request(&self, permission: &str) -> Result<bool, HostError>;
}

/// Host notification surface.
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// Show a notification, returning the host's identifier for it.
    async fn create(&self, options: NotificationOptions) -> Result<String, HostError>;
}

/// Opaque persistent key/value blob store (JSON values).
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Fetch the given keys. Missing keys are simply absent from the map.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, serde_json::Value>, HostError>;

    /// Merge `items` into the store.
    async fn set(&self, items: HashMap<String, serde_json::Value>) -> Result<(), HostError>;
}

/// Named alarms. Firing is reported back to the tracker as an alarm event.
#[async_trait]
pub trait AlarmScheduler: Send + Sync {
    /// Fire `name` every `period`, first after one `period`.
    async fn create_repeating(&self, name: &str, period: Duration) -> Result<(), HostError>;

    /// Fire `name` once after `delay`. Re-creating a pending alarm replaces it.
    async fn create_once(&self, name: &str, delay: Duration) -> Result<(), HostError>;
}
