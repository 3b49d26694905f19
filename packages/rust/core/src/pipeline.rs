//! End-to-end publish pipeline: fetch → map → resolve → transform → write.
//!
//! One-shot batch execution, single-threaded and synchronous. All records
//! are loaded into memory before any transformation begins — the
//! relationship resolver needs global visibility across the record set.
//! Any failure aborts the run; there is no partial-success reporting.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument};

use fieldpress_shared::{AppConfig, RawRecord, Result};
use fieldpress_transform::transform_record;

use crate::mapper;
use crate::renderer::Renderer;
use crate::resolver;

/// Configuration for one publish run.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Read the snapshot cache instead of the network.
    pub offline: bool,
    /// Root directory the collection directories are written under.
    pub output_root: PathBuf,
    /// Snapshot cache path.
    pub cache_file: PathBuf,
    /// Application config (CRM connection settings).
    pub app: AppConfig,
}

/// Result of a completed publish run.
#[derive(Debug)]
pub struct PublishResult {
    /// Number of record files written.
    pub records_written: usize,
    /// Where the collection directories were written.
    pub output_root: PathBuf,
    /// Whether the snapshot cache supplied the records.
    pub offline: bool,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each record file is written.
    fn record_written(&self, path: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &PublishResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn record_written(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &PublishResult) {}
}

/// Run the full publish pipeline.
///
/// 1. Fetch raw records (live CRM query, or the snapshot cache)
/// 2. Map source fields to canonical fields
/// 3. Resolve relationships across the whole set
/// 4. Transform fields to render-ready strings
/// 5. Render and write one file per record
#[instrument(skip_all, fields(offline = config.offline))]
pub fn publish(config: &PublishConfig, progress: &dyn ProgressReporter) -> Result<PublishResult> {
    progress.phase("Fetching records");
    let raw = fieldpress_source::fetch_raw_records(&config.app, config.offline, &config.cache_file)?;

    publish_raw_records(config, raw, progress)
}

/// Run the pipeline over an already-fetched raw record set.
///
/// Split out from [`publish`] so the transform stages can run without a
/// record source (tests, replays).
#[instrument(skip_all, fields(records = raw.len()))]
pub fn publish_raw_records(
    config: &PublishConfig,
    raw: Vec<RawRecord>,
    progress: &dyn ProgressReporter,
) -> Result<PublishResult> {
    let start = Instant::now();

    progress.phase("Mapping fields");
    let mut records = mapper::map_records(&raw)?;

    progress.phase("Resolving relationships");
    resolver::resolve_relationships(&mut records)?;

    progress.phase("Transforming fields");
    for record in &mut records {
        transform_record(record);
    }

    progress.phase("Writing site files");
    let mut renderer = Renderer::new(config.output_root.clone());
    let total = records.len();
    for (i, record) in records.iter().enumerate() {
        let path = renderer.write_record(record)?;
        progress.record_written(&path.display().to_string(), i + 1, total);
    }

    let result = PublishResult {
        records_written: total,
        output_root: config.output_root.clone(),
        offline: config.offline,
        elapsed: start.elapsed(),
    };

    info!(
        records = result.records_written,
        output_root = %result.output_root.display(),
        "publish complete"
    );
    progress.done(&result);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldpress_shared::{FIELD_MAP, FieldpressError};

    fn raw_record(title: &str, record_type: &str) -> RawRecord {
        let mut raw = RawRecord::new();
        for (_, source) in FIELD_MAP {
            raw.insert(source.to_string(), serde_json::Value::Null);
        }
        raw.insert("Id".into(), serde_json::json!(format!("id-{title}")));
        raw.insert("Name".into(), serde_json::json!(title));
        raw.insert("Type__c".into(), serde_json::json!(record_type));
        raw
    }

    fn test_config(output_root: &std::path::Path) -> PublishConfig {
        PublishConfig {
            offline: true,
            output_root: output_root.to_path_buf(),
            cache_file: output_root.join("records.json"),
            app: AppConfig::default(),
        }
    }

    #[test]
    fn end_to_end_over_raw_records() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut a = raw_record("Bike Share", "Solution");
        a.insert("Values_exemplified__c".into(), serde_json::json!("Equity"));
        a.insert(
            "Short_Write_Up__c".into(),
            serde_json::json!("Wheels for *everyone*."),
        );
        let v = raw_record("Equity", "Value");

        let config = test_config(dir.path());
        let result =
            publish_raw_records(&config, vec![a, v], &SilentProgress).expect("publish");

        assert_eq!(result.records_written, 2);

        let solution = std::fs::read_to_string(
            dir.path().join("_solutions").join("bike-share.md"),
        )
        .expect("solution file");
        assert!(solution.contains("values:\n- \"Equity\""));
        assert!(solution.contains("<em>everyone</em>"));

        // The backlink the Value record never declared
        let value = std::fs::read_to_string(dir.path().join("_values").join("equity.md"))
            .expect("value file");
        assert!(value.contains("related_solutions:\n- \"Bike Share\""));
    }

    #[test]
    fn missing_source_field_aborts_without_output() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut bad = raw_record("Bike Share", "Solution");
        bad.remove("Who__c");
        let good = raw_record("Equity", "Value");

        let config = test_config(dir.path());
        let err = publish_raw_records(&config, vec![bad, good], &SilentProgress).unwrap_err();

        assert!(matches!(err, FieldpressError::Mapping { .. }));
        // Mapping fails before any file is written
        assert!(!dir.path().join("_values").exists());
        assert!(!dir.path().join("_solutions").exists());
    }

    #[test]
    fn offline_publish_reads_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path());

        let records = vec![raw_record("Equity", "Value")];
        fieldpress_source::store_snapshot(&config.cache_file, &records).expect("store");

        let result = publish(&config, &SilentProgress).expect("publish");
        assert_eq!(result.records_written, 1);
        assert!(dir.path().join("_values").join("equity.md").is_file());
    }

    #[test]
    fn offline_publish_without_snapshot_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path());

        let err = publish(&config, &SilentProgress).unwrap_err();
        assert!(matches!(err, FieldpressError::Cache { .. }));
    }
}
