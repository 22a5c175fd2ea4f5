//! Background service: the single event queue in front of the tracker.
//!
//! Host events and fired alarms are processed one at a time, each handler
//! running to completion before the next starts, so every read-modify-write of
//! tracker state is serialized without locks.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::tracker::{
    DownloadDelta, DownloadId, DownloadItem, DownloadTracker, PermissionsDelta, TrackerStats,
};

/// Events delivered by the host, in the shape of a replayable JSON line:
/// `{"event": "created", "id": 1, "filename": "a.pdf"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Created(DownloadItem),
    Changed(DownloadDelta),
    Erased { id: DownloadId },
    PermissionsRemoved(PermissionsDelta),
    Alarm { name: String },
}

#[derive(Debug)]
pub enum ServiceCommand {
    Event(HostEvent),
    Stats { respond_to: oneshot::Sender<TrackerStats> },
}

/// Dispatch one event to the tracker.
pub async fn dispatch(tracker: &mut DownloadTracker, event: HostEvent) {
    match event {
        HostEvent::Created(item) => tracker.on_download_created(&item).await,
        HostEvent::Changed(delta) => tracker.on_download_changed(&delta).await,
        HostEvent::Erased { id } => tracker.on_download_erased(id).await,
        HostEvent::PermissionsRemoved(delta) => tracker.on_permissions_removed(&delta),
        HostEvent::Alarm { name } => tracker.on_alarm(&name).await,
    }
}

/// Handle to a running service.
pub struct ServiceHandle {
    commands: mpsc::Sender<ServiceCommand>,
    task: JoinHandle<DownloadTracker>,
}

impl ServiceHandle {
    /// Queue a host event.
    pub async fn send(&self, event: HostEvent) -> Result<()> {
        self.commands
            .send(ServiceCommand::Event(event))
            .await
            .context("background service stopped")
    }

    /// Current stats; the default (empty) snapshot if the service is gone.
    pub async fn stats(&self) -> TrackerStats {
        let (respond_to, rx) = oneshot::channel();
        if self
            .commands
            .send(ServiceCommand::Stats { respond_to })
            .await
            .is_err()
        {
            tracing::warn!("stats requested after service stopped");
            return TrackerStats::default();
        }
        rx.await.unwrap_or_default()
    }

    /// Stop accepting events, drain the queue, and hand back the tracker.
    pub async fn shutdown(self) -> Result<DownloadTracker> {
        drop(self.commands);
        self.task.await.context("background service panicked")
    }
}

enum Next {
    Command(Option<ServiceCommand>),
    Alarm(Option<String>),
}

pub struct BackgroundService {
    tracker: DownloadTracker,
    alarms: Option<mpsc::UnboundedReceiver<String>>,
}

impl BackgroundService {
    /// `alarms` carries names of fired alarms (see `host::desktop::TokioAlarms`).
    pub fn new(tracker: DownloadTracker, alarms: Option<mpsc::UnboundedReceiver<String>>) -> Self {
        Self { tracker, alarms }
    }

    /// Initialize the tracker and start processing on a tokio task.
    pub fn spawn(self) -> ServiceHandle {
        let (commands, receiver) = mpsc::channel(64);
        let task = tokio::spawn(self.run(receiver));
        ServiceHandle { commands, task }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<ServiceCommand>) -> DownloadTracker {
        self.tracker.initialize().await;
        tracing::info!("background service started");

        loop {
            let next = tokio::select! {
                biased;
                cmd = commands.recv() => Next::Command(cmd),
                alarm = next_alarm(&mut self.alarms) => Next::Alarm(alarm),
            };
            match next {
                Next::Command(Some(ServiceCommand::Event(event))) => {
                    tracing::trace!(?event, "host event");
                    dispatch(&mut self.tracker, event).await;
                }
                Next::Command(Some(ServiceCommand::Stats { respond_to })) => {
                    let _ = respond_to.send(self.tracker.stats());
                }
                // all senders dropped
                Next::Command(None) => break,
                Next::Alarm(Some(name)) => {
                    tracing::debug!(alarm = %name, "alarm fired");
                    self.tracker.on_alarm(&name).await;
                }
                Next::Alarm(None) => self.alarms = None,
            }
        }

        tracing::info!("background service stopped");
        self.tracker
    }
}

async fn next_alarm(alarms: &mut Option<mpsc::UnboundedReceiver<String>>) -> Option<String> {
    match alarms {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
