//! Chart data aggregation: shared axis ranges and render ordering.

use std::path::{Path, PathBuf};

use crate::domain::{AxisRanges, DataRecord, HarnessError, Result};
use crate::obs::emit_chart_written;
use crate::render::ChartRenderer;

/// Records of a run together with the axis ranges every chart shares.
///
/// The ranges come from the first record only. Other records may extend past
/// them, in which case their charts are clipped to the shared extents.
#[derive(Debug, Clone)]
pub struct ChartPlan<'a> {
    records: &'a [DataRecord],
    ranges: AxisRanges,
}

impl<'a> ChartPlan<'a> {
    /// Fails with [`HarnessError::NoRecords`] on an empty collection.
    pub fn new(records: &'a [DataRecord]) -> Result<Self> {
        let first = records.first().ok_or(HarnessError::NoRecords)?;
        Ok(Self {
            records,
            ranges: AxisRanges::from_record(first)?,
        })
    }

    pub fn ranges(&self) -> &AxisRanges {
        &self.ranges
    }

    pub fn records(&self) -> &'a [DataRecord] {
        self.records
    }

    /// Render the aggregate chart, then one chart per record in order.
    ///
    /// Returns the written paths in the same order.
    pub fn render(&self, out_dir: &Path, renderer: &mut dyn ChartRenderer) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.records.len() + 1);

        let path = renderer.render_aggregate(out_dir, self.records, &self.ranges)?;
        emit_chart_written("aggregate", &path);
        written.push(path);

        for record in self.records {
            let path = renderer.render_entity(out_dir, record, &self.ranges)?;
            emit_chart_written(record.name(), &path);
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Axis, AxisRange};

    fn record(name: &str, values: &[f64]) -> DataRecord {
        DataRecord::from_triplets(name, values).unwrap()
    }

    #[test]
    fn test_empty_collection_is_no_records() {
        let err = ChartPlan::new(&[]).unwrap_err();
        assert!(matches!(err, HarnessError::NoRecords));
    }

    #[test]
    fn test_ranges_from_first_record_only() {
        let records = vec![
            record("First", &[0.2, 0.05, 1.0, 0.1, 0.01, 2.0, 0.4, 0.03, 3.0]),
            record("Wide", &[-5.0, -5.0, 1.0, 9.0, 9.0, 1.0]),
        ];
        let plan = ChartPlan::new(&records).unwrap();
        assert_eq!(plan.ranges().miscommunication, AxisRange::new(0.1, 0.4));
        assert_eq!(plan.ranges().misexecution, AxisRange::new(0.01, 0.05));
    }

    #[test]
    fn test_first_record_without_values() {
        let records = vec![record("Empty", &[]), record("Full", &[0.0, 0.0, 1.0])];
        let err = ChartPlan::new(&records).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::EmptyAxis {
                axis: Axis::Miscommunication,
                ..
            }
        ));
    }
}
