//! Desktop host used by the CLI: permission answer from config, notifications
//! rendered to the log (and optionally stdout), alarms on tokio timers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{AlarmScheduler, HostError, NotificationApi, NotificationOptions, PermissionApi};

/// Permission answer fixed by `notifications_granted` in config.toml.
#[derive(Debug)]
pub struct ConfigPermissions {
    granted: AtomicBool,
}

impl ConfigPermissions {
    pub fn new(granted: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
        }
    }
}

#[async_trait]
impl PermissionApi for ConfigPermissions {
    async fn contains(&self, _permission: &str) -> Result<bool, HostError> {
        Ok(self.granted.load(Ordering::Relaxed))
    }

    async fn request(&self, permission: &str) -> Result<bool, HostError> {
        let granted = self.granted.load(Ordering::Relaxed);
        if !granted {
            tracing::info!(permission, "permission prompt declined by config");
        }
        Ok(granted)
    }
}

/// Notification surface that writes each notification as a log event.
#[derive(Debug, Default)]
pub struct LogNotifier {
    print: bool,
    next_id: AtomicU64,
}

impl LogNotifier {
    /// With `print` set, notifications are also written to stdout.
    pub fn new(print: bool) -> Self {
        Self {
            print,
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl NotificationApi for LogNotifier {
    async fn create(&self, options: NotificationOptions) -> Result<String, HostError> {
        let id = format!("dlnotify-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::info!(
            id = %id,
            title = %options.title,
            message = %options.message,
            "notification"
        );
        if self.print {
            println!("[{}] {}", options.title, options.message);
        }
        Ok(id)
    }
}

/// Alarms backed by spawned tokio timers. Fired alarm names are sent on the
/// channel handed to [`TokioAlarms::new`].
#[derive(Debug)]
pub struct TokioAlarms {
    fired: mpsc::UnboundedSender<String>,
    pending: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TokioAlarms {
    /// Create the scheduler and the receiver on which alarm names arrive.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (fired, rx) = mpsc::unbounded_channel();
        (
            Self {
                fired,
                pending: Mutex::new(HashMap::new()),
            },
            rx,
        )
    }

    fn replace(&self, name: &str, handle: JoinHandle<()>) {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        pending.retain(|_, h| !h.is_finished());
        if let Some(old) = pending.insert(name.to_string(), handle) {
            old.abort();
        }
    }

    /// Number of alarms that have not fired (or, for repeating ones, are still armed).
    pub fn pending_count(&self) -> usize {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        pending.values().filter(|h| !h.is_finished()).count()
    }
}

#[async_trait]
impl AlarmScheduler for TokioAlarms {
    async fn create_repeating(&self, name: &str, period: Duration) -> Result<(), HostError> {
        let tx = self.fired.clone();
        let alarm = name.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if tx.send(alarm.clone()).is_err() {
                    break;
                }
            }
        });
        self.replace(name, handle);
        Ok(())
    }

    async fn create_once(&self, name: &str, delay: Duration) -> Result<(), HostError> {
        let tx = self.fired.clone();
        let alarm = name.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(alarm);
        });
        self.replace(name, handle);
        Ok(())
    }
}

impl Drop for TokioAlarms {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (_, handle) in pending.drain() {
            handle.abort();
        }
    }
}
