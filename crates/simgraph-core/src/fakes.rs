//! In-memory fakes for the rendering seam (testing only).

use std::path::{Path, PathBuf};

use crate::domain::{AxisRanges, DataRecord, HarnessError, Result};
use crate::layout::chart_path;
use crate::render::{ChartRenderer, DEFAULT_AGGREGATE_NAME};

/// One call received by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Aggregate {
        names: Vec<String>,
        ranges: AxisRanges,
    },
    Entity {
        name: String,
        ranges: AxisRanges,
    },
}

/// Renderer that records calls instead of drawing.
///
/// Returned paths are where the real renderer would have written; nothing is
/// created on disk.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
    fail_on: Option<String>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the entity call for `name` fail with a render error.
    pub fn failing_on(name: impl Into<String>) -> Self {
        Self {
            calls: Vec::new(),
            fail_on: Some(name.into()),
        }
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    /// Names of entity calls in the order they were received.
    pub fn entity_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RenderCall::Entity { name, .. } => Some(name.as_str()),
                RenderCall::Aggregate { .. } => None,
            })
            .collect()
    }
}

impl ChartRenderer for RecordingRenderer {
    fn render_aggregate(
        &mut self,
        out_dir: &Path,
        records: &[DataRecord],
        ranges: &AxisRanges,
    ) -> Result<PathBuf> {
        self.calls.push(RenderCall::Aggregate {
            names: records.iter().map(|r| r.name().to_string()).collect(),
            ranges: *ranges,
        });
        Ok(chart_path(out_dir, DEFAULT_AGGREGATE_NAME))
    }

    fn render_entity(
        &mut self,
        out_dir: &Path,
        record: &DataRecord,
        ranges: &AxisRanges,
    ) -> Result<PathBuf> {
        self.calls.push(RenderCall::Entity {
            name: record.name().to_string(),
            ranges: *ranges,
        });
        if self.fail_on.as_deref() == Some(record.name()) {
            return Err(HarnessError::Render(format!(
                "refusing to draw {}",
                record.name()
            )));
        }
        Ok(chart_path(out_dir, record.name()))
    }
}
