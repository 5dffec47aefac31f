use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::time::now_iso8601;

pub const LOG_VERSION: &str = "1.0";

/// Stage tallies for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_carts: usize,
    pub completed: usize,
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub timestamp: String,
    pub action: String,
    pub run_id: String,
    pub summary: RunSummary,
    #[serde(default)]
    pub data: Value,
}

/// The whole persisted log. Entries are only ever appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogDocument {
    pub activities: Vec<ActivityLogEntry>,
    pub version: String,
    pub created: String,
}

impl ActivityLogDocument {
    pub fn new() -> Self {
        Self {
            activities: Vec::new(),
            version: LOG_VERSION.to_string(),
            created: now_iso8601(),
        }
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

impl Default for ActivityLogDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Somewhere a finished run can be recorded.
pub trait ActivitySink {
    type Error: std::fmt::Display;

    fn append(&self, entry: ActivityLogEntry) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let doc = ActivityLogDocument::new();
        assert!(doc.is_empty());
        assert_eq!(doc.version, "1.0");
        assert!(doc.created.ends_with('Z'));
    }

    #[test]
    fn test_entry_data_defaults_to_null() {
        let json = r#"{
            "timestamp": "2026-01-01T00:00:00Z",
            "action": "cart_run",
            "run_id": "0011223344556677",
            "summary": {"total_carts": 4, "completed": 4, "timestamp": "2026-01-01T00:00:01Z"}
        }"#;
        let entry: ActivityLogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.summary.completed, 4);
        assert!(entry.data.is_null());
    }
}
