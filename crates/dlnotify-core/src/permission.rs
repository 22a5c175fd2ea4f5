//! Notification permission gatekeeper.
//!
//! Every notification goes through [`PermissionGate::attempt_notify`]. When the
//! permission is missing (never granted, declined, or revoked by the user) the
//! attempt is skipped quietly and the rest of the tracker keeps working.

use std::sync::Arc;

use crate::host::{NotificationApi, NotificationOptions, PermissionApi, NOTIFICATIONS_PERMISSION};

/// Result of a notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The host showed the notification under this id.
    Shown(String),
    /// No permission, or the host failed to show it.
    Skipped,
}

impl NotifyOutcome {
    pub fn is_shown(&self) -> bool {
        matches!(self, NotifyOutcome::Shown(_))
    }
}

pub struct PermissionGate {
    permissions: Arc<dyn PermissionApi>,
    notifications: Arc<dyn NotificationApi>,
    granted: bool,
}

impl PermissionGate {
    /// Starts as not granted; call [`check_permission`](Self::check_permission) to sync with the host.
    pub fn new(permissions: Arc<dyn PermissionApi>, notifications: Arc<dyn NotificationApi>) -> Self {
        Self {
            permissions,
            notifications,
            granted: false,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }

    /// Query the host for the current grant status.
    pub async fn check_permission(&mut self) -> bool {
        self.granted = match self.permissions.contains(NOTIFICATIONS_PERMISSION).await {
            Ok(granted) => granted,
            Err(e) => {
                tracing::warn!("error checking notification permission: {}", e);
                false
            }
        };
        if !self.granted {
            tracing::info!("notification permission not granted; continuing without notifications");
        }
        self.granted
    }

    /// Ask the host to prompt for the permission.
    pub async fn request_permission(&mut self) -> bool {
        match self.permissions.request(NOTIFICATIONS_PERMISSION).await {
            Ok(granted) => {
                self.granted = granted;
                granted
            }
            Err(e) => {
                tracing::error!("error requesting notification permission: {}", e);
                self.granted = false;
                false
            }
        }
    }

    /// Show a notification if permitted, requesting the permission first when needed.
    pub async fn attempt_notify(&mut self, options: NotificationOptions) -> NotifyOutcome {
        if !self.granted && !self.request_permission().await {
            tracing::info!(title = %options.title, "notification skipped: permission not granted");
            return NotifyOutcome::Skipped;
        }

        match self.notifications.create(options).await {
            Ok(id) => {
                tracing::debug!(id = %id, "notification shown");
                NotifyOutcome::Shown(id)
            }
            Err(e) => {
                tracing::warn!("failed to create notification: {}", e);
                NotifyOutcome::Skipped
            }
        }
    }

    /// The host reported that the permission was withdrawn.
    pub fn on_permission_revoked(&mut self) {
        self.granted = false;
        tracing::info!("notification permission removed; continuing without notifications");
    }
}
