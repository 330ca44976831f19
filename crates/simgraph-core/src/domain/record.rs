//! Parsed simulation results and the axis ranges derived from them.

use serde::{Deserialize, Serialize};

use super::error::{Axis, HarnessError, Result};

/// One entity's simulation results.
///
/// The three value sequences are always the same length: they are decoded
/// from one flat field list at stride 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    name: String,
    miscommunication: Vec<f64>,
    misexecution: Vec<f64>,
    scores: Vec<f64>,
}

impl DataRecord {
    /// Decode a record from its name and a flat `(miscommunication,
    /// misexecution, score)` value list.
    ///
    /// Returns `None` when `values.len()` is not a multiple of 3.
    pub fn from_triplets(name: impl Into<String>, values: &[f64]) -> Option<Self> {
        if values.len() % 3 != 0 {
            return None;
        }

        let mut miscommunication = Vec::with_capacity(values.len() / 3);
        let mut misexecution = Vec::with_capacity(values.len() / 3);
        let mut scores = Vec::with_capacity(values.len() / 3);
        for step in values.chunks_exact(3) {
            miscommunication.push(step[0]);
            misexecution.push(step[1]);
            scores.push(step[2]);
        }

        Some(Self {
            name: name.into(),
            miscommunication,
            misexecution,
            scores,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn miscommunication(&self) -> &[f64] {
        &self.miscommunication
    }

    pub fn misexecution(&self) -> &[f64] {
        &self.misexecution
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Number of simulated steps.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Values of the given axis.
    pub fn axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Miscommunication => &self.miscommunication,
            Axis::Misexecution => &self.misexecution,
        }
    }
}

/// Closed `(min, max)` bounds of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Smallest and largest value of `values`, or `None` if empty.
    pub fn of(values: &[f64]) -> Option<Self> {
        let (first, rest) = values.split_first()?;
        let range = rest.iter().fold(Self::new(*first, *first), |acc, v| {
            Self::new(acc.min.min(*v), acc.max.max(*v))
        });
        Some(range)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// The shared x-axis extents used by every chart of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRanges {
    pub miscommunication: AxisRange,
    pub misexecution: AxisRange,
}

impl AxisRanges {
    /// Derive both ranges from a single record.
    pub fn from_record(record: &DataRecord) -> Result<Self> {
        let range_of = |axis: Axis| {
            AxisRange::of(record.axis(axis)).ok_or_else(|| HarnessError::EmptyAxis {
                name: record.name().to_string(),
                axis,
            })
        };

        Ok(Self {
            miscommunication: range_of(Axis::Miscommunication)?,
            misexecution: range_of(Axis::Misexecution)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_triplets_splits_at_stride_three() {
        let record =
            DataRecord::from_triplets("TitForTat", &[0.0, 0.0, 10.0, 0.5, 0.1, 8.0]).unwrap();
        assert_eq!(record.name(), "TitForTat");
        assert_eq!(record.miscommunication(), &[0.0, 0.5]);
        assert_eq!(record.misexecution(), &[0.0, 0.1]);
        assert_eq!(record.scores(), &[10.0, 8.0]);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_from_triplets_rejects_partial_step() {
        assert!(DataRecord::from_triplets("Grudger", &[0.0, 0.0, 1.0, 0.5]).is_none());
    }

    #[test]
    fn test_from_triplets_accepts_name_only() {
        let record = DataRecord::from_triplets("Random", &[]).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_axis_range_of_unsorted_values() {
        let range = AxisRange::of(&[0.3, -1.0, 2.5, 0.0]).unwrap();
        assert_eq!(range, AxisRange::new(-1.0, 2.5));
        assert_eq!(range.span(), 3.5);
    }

    #[test]
    fn test_axis_range_of_empty() {
        assert!(AxisRange::of(&[]).is_none());
    }

    #[test]
    fn test_axis_ranges_from_empty_record_fails() {
        let record = DataRecord::from_triplets("Random", &[]).unwrap();
        let err = AxisRanges::from_record(&record).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::EmptyAxis {
                axis: Axis::Miscommunication,
                ..
            }
        ));
    }
}
