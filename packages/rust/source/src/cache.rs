//! Snapshot cache for raw CRM records.
//!
//! A JSON file holding the raw record sequence plus the time it was
//! fetched. Written after every successful live fetch; read back when
//! the pipeline runs offline.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use fieldpress_shared::{FieldpressError, RawRecord, Result};

/// On-disk snapshot of a raw record fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the live fetch producing this snapshot completed.
    pub fetched_at: DateTime<Utc>,
    /// The raw records, exactly as the CRM returned them.
    pub records: Vec<RawRecord>,
}

/// Write a snapshot of the given records, creating parent directories as
/// needed.
pub fn store_snapshot(path: &Path, records: &[RawRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| FieldpressError::io(parent, e))?;
        }
    }

    let snapshot = Snapshot {
        fetched_at: Utc::now(),
        records: records.to_vec(),
    };
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| FieldpressError::validation(format!("snapshot serialization failed: {e}")))?;

    std::fs::write(path, json).map_err(|e| FieldpressError::io(path, e))?;
    debug!(path = %path.display(), count = records.len(), "snapshot written");

    Ok(())
}

/// Load a previously written snapshot. Missing or unreadable snapshots
/// are fatal — offline mode has nothing else to work from.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Err(FieldpressError::cache(format!(
            "no snapshot at {} — run a live fetch first",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| FieldpressError::io(path, e))?;

    serde_json::from_str(&content).map_err(|e| {
        FieldpressError::cache(format!("invalid snapshot {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<RawRecord> {
        let row: RawRecord = serde_json::from_str(
            r#"{"Name": "Bike Share", "Type__c": "Solution", "Who__c": null}"#,
        )
        .expect("parse row");
        vec![row]
    }

    #[test]
    fn snapshot_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("var").join("records.json");

        store_snapshot(&path, &sample_records()).expect("store");
        let snapshot = load_snapshot(&path).expect("load");

        assert_eq!(snapshot.records, sample_records());
        assert_eq!(snapshot.records[0]["Who__c"], serde_json::Value::Null);
    }

    #[test]
    fn missing_snapshot_is_a_cache_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_snapshot(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FieldpressError::Cache { .. }));
        assert!(err.to_string().contains("run a live fetch first"));
    }

    #[test]
    fn corrupt_snapshot_is_a_cache_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("records.json");
        std::fs::write(&path, "not json").expect("write");

        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, FieldpressError::Cache { .. }));
    }
}
