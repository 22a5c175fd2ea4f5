//! Per-download record.

use serde::{Deserialize, Serialize};

/// Display name used when the host gives us no filename.
pub const UNKNOWN_FILENAME: &str = "Unknown file";

/// Host download identifier.
pub type DownloadId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub filename: String,
    /// Milliseconds since the Unix epoch. Persisted as `timestamp`.
    #[serde(rename = "timestamp")]
    pub created_at: i64,
    /// Set once a terminal state (complete or interrupted) has been seen.
    #[serde(default)]
    pub completed: bool,
}

impl DownloadRecord {
    pub fn new(filename: Option<&str>, created_at: i64) -> Self {
        Self {
            filename: display_name(filename).to_string(),
            created_at,
            completed: false,
        }
    }
}

/// `filename`, or the placeholder when it is missing or empty.
pub fn display_name(filename: Option<&str>) -> &str {
    match filename {
        Some(name) if !name.is_empty() => name,
        _ => UNKNOWN_FILENAME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_filename_uses_placeholder() {
        assert_eq!(DownloadRecord::new(None, 0).filename, UNKNOWN_FILENAME);
        assert_eq!(DownloadRecord::new(Some(""), 0).filename, UNKNOWN_FILENAME);
        assert_eq!(DownloadRecord::new(Some("a.pdf"), 0).filename, "a.pdf");
    }

    #[test]
    fn persisted_field_names() {
        let json = serde_json::to_value(DownloadRecord::new(Some("a.pdf"), 5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"filename": "a.pdf", "timestamp": 5, "completed": false})
        );
    }
}
