//! Key/value storage persisted as one JSON object on disk (under the XDG state
//! dir by default) so tracked downloads survive process restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use super::{HostError, KeyValueStorage};

/// Suffix of the temp file written before the atomic rename.
const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default path for the state file: `~/.local/state/dlnotify/state.json`.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("dlnotify")?;
        Ok(xdg_dirs.get_state_home().join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole file as a map. A missing file is an empty store.
    async fn read_all(&self) -> Result<HashMap<String, serde_json::Value>, HostError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(HostError::storage(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_all(&self, data: &HashMap<String, serde_json::Value>) -> Result<(), HostError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| HostError::storage(format!("create dir {}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_vec_pretty(data)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(TEMP_SUFFIX);
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| HostError::storage(format!("write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| HostError::storage(format!("rename to {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, serde_json::Value>, HostError> {
        let mut all = self.read_all().await?;
        Ok(keys
            .iter()
            .filter_map(|k| all.remove(*k).map(|v| (k.to_string(), v)))
            .collect())
    }

    async fn set(&self, items: HashMap<String, serde_json::Value>) -> Result<(), HostError> {
        // An unreadable file is replaced by this write rather than blocking it.
        let mut all = self.read_all().await.unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), "discarding unreadable state file: {}", e);
            HashMap::new()
        });
        all.extend(items);
        self.write_all(&all).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nope.json"));
        let got = storage.get(&["downloads"]).await.unwrap();
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn set_merges_keys_and_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("state.json"));

        let mut first = HashMap::new();
        first.insert("lastNotificationTime".to_string(), json!(42));
        storage.set(first).await.unwrap();

        let mut second = HashMap::new();
        second.insert("downloads".to_string(), json!([]));
        storage.set(second).await.unwrap();

        let got = storage
            .get(&["downloads", "lastNotificationTime", "other"])
            .await
            .unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got["lastNotificationTime"], json!(42));
        assert_eq!(got["downloads"], json!([]));
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"not json").unwrap();
        let storage = FileStorage::new(&path);
        let err = storage.get(&["downloads"]).await.unwrap_err();
        assert!(matches!(err, HostError::Serialization(_)));
    }

    #[tokio::test]
    async fn set_replaces_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{truncated").unwrap();
        let storage = FileStorage::new(&path);

        let mut items = HashMap::new();
        items.insert("downloads".to_string(), json!([]));
        storage.set(items).await.unwrap();

        let got = storage.get(&["downloads"]).await.unwrap();
        assert_eq!(got["downloads"], json!([]));
    }

    #[tokio::test]
    async fn set_replaces_non_object_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"[1, 2, 3]").unwrap();
        let storage = FileStorage::new(&path);

        let mut items = HashMap::new();
        items.insert("lastNotificationTime".to_string(), json!(7));
        storage.set(items).await.unwrap();

        let got = storage.get(&["lastNotificationTime"]).await.unwrap();
        assert_eq!(got["lastNotificationTime"], json!(7));
    }
}
