//! Run manifest written next to the charts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::domain::{AxisRanges, Result};

pub const MANIFEST_FILE_NAME: &str = "run.json";
pub const MANIFEST_SCHEMA_VERSION: &str = "1";

/// Summary of one run, persisted as `run.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub schema_version: String,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub commit_label: String,
    pub record_names: Vec<String>,
    pub ranges: AxisRanges,
    /// Chart file names relative to the run directory, in render order.
    pub charts: Vec<String>,
    pub simulation_exit_code: Option<i32>,
    pub notice_lines: usize,
}

impl RunManifest {
    /// Build a manifest; `charts` are reduced to their file names.
    pub fn new(
        run_id: Uuid,
        commit_label: impl Into<String>,
        record_names: Vec<String>,
        ranges: AxisRanges,
        charts: &[PathBuf],
    ) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION.to_string(),
            run_id,
            generated_at: Utc::now(),
            commit_label: commit_label.into(),
            record_names,
            ranges,
            charts: charts
                .iter()
                .map(|p| {
                    p.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| p.to_string_lossy().into_owned())
                })
                .collect(),
            simulation_exit_code: None,
            notice_lines: 0,
        }
    }

    pub fn with_simulation(mut self, exit_code: Option<i32>, notice_lines: usize) -> Self {
        self.simulation_exit_code = exit_code;
        self.notice_lines = notice_lines;
        self
    }
}

/// Write `run.json` into `out_dir` in pretty JSON format.
pub fn write_run_manifest(out_dir: &Path, manifest: &RunManifest) -> Result<PathBuf> {
    let path = out_dir.join(MANIFEST_FILE_NAME);
    let content = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&path, content)?;
    Ok(path)
}
