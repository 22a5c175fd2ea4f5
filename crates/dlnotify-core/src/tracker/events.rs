//! Payloads of host download and permission events.
//!
//! Field names follow the host's JSON (`camelCase`) so a recorded event stream
//! can be replayed as-is.

use serde::{Deserialize, Serialize};

use super::record::DownloadId;

/// Delivered when the host starts a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadItem {
    pub id: DownloadId,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Lifecycle state reported in a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    InProgress,
    Complete,
    Interrupted,
    #[serde(other)]
    Other,
}

impl DownloadState {
    /// No further transition is expected after a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, DownloadState::Complete | DownloadState::Interrupted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub current: DownloadState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<DownloadState>,
}

/// Delivered when any property of a download changes. Only `state` matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadDelta {
    pub id: DownloadId,
    #[serde(default)]
    pub state: Option<StateChange>,
}

impl DownloadDelta {
    pub fn to_state(id: DownloadId, current: DownloadState) -> Self {
        Self {
            id,
            state: Some(StateChange {
                current,
                previous: None,
            }),
        }
    }

    pub fn current_state(&self) -> Option<DownloadState> {
        self.state.map(|s| s.current)
    }
}

/// Delivered when the user withdraws optional permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsDelta {
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl PermissionsDelta {
    pub fn includes(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_change_payload() {
        let delta: DownloadDelta =
            serde_json::from_str(r#"{"id": 3, "state": {"current": "complete", "previous": "in_progress"}}"#)
                .unwrap();
        assert_eq!(delta.current_state(), Some(DownloadState::Complete));

        let unknown: DownloadDelta =
            serde_json::from_str(r#"{"id": 3, "state": {"current": "paused"}}"#).unwrap();
        assert_eq!(unknown.current_state(), Some(DownloadState::Other));

        let no_state: DownloadDelta = serde_json::from_str(r#"{"id": 3, "paused": {}}"#).unwrap();
        assert_eq!(no_state.current_state(), None);
    }

    #[test]
    fn created_item_tolerates_missing_filename() {
        let item: DownloadItem = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert_eq!(item.filename, None);
    }
}
