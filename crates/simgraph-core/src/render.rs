//! Chart rendering seam and the plotters-backed PNG renderer.

use plotters::prelude::*;
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::domain::{AxisRange, AxisRanges, DataRecord, HarnessError, Result};
use crate::layout::chart_path;

/// Default name (and file stem) of the aggregate chart.
pub const DEFAULT_AGGREGATE_NAME: &str = "All Strategies";

pub const MISCOMMUNICATION_LABEL: &str = "Miscommunication Rate";
pub const MISEXECUTION_LABEL: &str = "Misexecution Rate";
pub const SCORE_LABEL: &str = "Average Points";

/// Draws charts for a run.
///
/// Both calls receive the run's shared x-axis ranges unmodified and return
/// the path of the file they wrote.
pub trait ChartRenderer {
    /// One chart overlaying every record.
    fn render_aggregate(
        &mut self,
        out_dir: &Path,
        records: &[DataRecord],
        ranges: &AxisRanges,
    ) -> Result<PathBuf>;

    /// One chart for a single record.
    fn render_entity(
        &mut self,
        out_dir: &Path,
        record: &DataRecord,
        ranges: &AxisRanges,
    ) -> Result<PathBuf>;
}

/// PNG renderer backed by `plotters`' bitmap backend.
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    size: (u32, u32),
    aggregate_name: String,
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self::new((1280, 720), DEFAULT_AGGREGATE_NAME)
    }
}

impl PlottersRenderer {
    pub fn new(size: (u32, u32), aggregate_name: impl Into<String>) -> Self {
        Self {
            size,
            aggregate_name: aggregate_name.into(),
        }
    }

    pub fn aggregate_name(&self) -> &str {
        &self.aggregate_name
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render_aggregate(
        &mut self,
        out_dir: &Path,
        records: &[DataRecord],
        ranges: &AxisRanges,
    ) -> Result<PathBuf> {
        let path = chart_path(out_dir, &self.aggregate_name);
        let title = format!("{} vs Fail Chance", self.aggregate_name);
        let series: Vec<&DataRecord> = records.iter().collect();
        draw_chart(&path, self.size, &title, &series, ranges, true)
            .map_err(|e| render_error(&path, e))?;
        Ok(path)
    }

    fn render_entity(
        &mut self,
        out_dir: &Path,
        record: &DataRecord,
        ranges: &AxisRanges,
    ) -> Result<PathBuf> {
        let path = chart_path(out_dir, record.name());
        let title = format!("{} Average Points vs Fail Chance", record.name());
        draw_chart(&path, self.size, &title, &[record], ranges, false)
            .map_err(|e| render_error(&path, e))?;
        Ok(path)
    }
}

fn render_error(path: &Path, err: Box<dyn Error>) -> HarnessError {
    HarnessError::Render(format!("{}: {err}", path.display()))
}

/// Score axis bounds over every plotted record, padded by 5% each side.
pub fn score_axis(records: &[&DataRecord]) -> AxisRange {
    let scores: Vec<f64> = records
        .iter()
        .flat_map(|r| r.scores().iter().copied())
        .collect();
    match AxisRange::of(&scores) {
        Some(range) => pad(range, 0.05),
        None => AxisRange::new(0.0, 1.0),
    }
}

/// Widen `range` by `fraction` of its span each side; a zero-width range is
/// widened by one unit so the chart still has an extent.
fn pad(range: AxisRange, fraction: f64) -> AxisRange {
    let span = range.span();
    if span <= 0.0 {
        return AxisRange::new(range.min - 1.0, range.max + 1.0);
    }
    AxisRange::new(range.min - span * fraction, range.max + span * fraction)
}

/// Fixed x bounds are drawn as given unless they have no width.
fn drawable(range: AxisRange) -> AxisRange {
    if range.span() > 0.0 {
        range
    } else {
        pad(range, 0.0)
    }
}

fn draw_chart(
    path: &Path,
    size: (u32, u32),
    title: &str,
    records: &[&DataRecord],
    ranges: &AxisRanges,
    with_legend: bool,
) -> std::result::Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let x = drawable(ranges.miscommunication);
    let x2 = drawable(ranges.misexecution);
    let y = score_axis(records);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .top_x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x.min..x.max, y.min..y.max)?
        .set_secondary_coord(x2.min..x2.max, y.min..y.max);

    chart
        .configure_mesh()
        .x_desc(MISCOMMUNICATION_LABEL)
        .y_desc(SCORE_LABEL)
        .draw()?;
    chart
        .configure_secondary_axes()
        .x_desc(MISEXECUTION_LABEL)
        .draw()?;

    for (i, record) in records.iter().enumerate() {
        let color = Palette99::pick(i).mix(0.9);
        let points: Vec<(f64, f64)> = record
            .miscommunication()
            .iter()
            .copied()
            .zip(record.scores().iter().copied())
            .collect();

        let series = chart.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?;
        if with_legend {
            series
                .label(record.name())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        chart.draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))?;
    }

    if with_legend && !records.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, values: &[f64]) -> DataRecord {
        DataRecord::from_triplets(name, values).unwrap()
    }

    #[test]
    fn test_score_axis_spans_all_records() {
        let a = record("A", &[0.0, 0.0, 10.0, 0.5, 0.1, 8.0]);
        let b = record("B", &[0.0, 0.0, 2.0, 0.5, 0.1, 1.0]);
        let axis = score_axis(&[&a, &b]);
        assert!((axis.min - 0.55).abs() < 1e-9);
        assert!((axis.max - 10.45).abs() < 1e-9);
    }

    #[test]
    fn test_score_axis_constant_scores() {
        let a = record("A", &[0.0, 0.0, 3.0, 0.5, 0.1, 3.0]);
        assert_eq!(score_axis(&[&a]), AxisRange::new(2.0, 4.0));
    }

    #[test]
    fn test_score_axis_without_values() {
        let a = record("A", &[]);
        assert_eq!(score_axis(&[&a]), AxisRange::new(0.0, 1.0));
    }

    #[test]
    fn test_drawable_keeps_given_bounds() {
        let range = AxisRange::new(0.0, 0.5);
        assert_eq!(drawable(range), range);
        assert_eq!(drawable(AxisRange::new(0.5, 0.5)), AxisRange::new(-0.5, 1.5));
    }

    fn assert_png(path: &Path) {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"), "{} is not a PNG", path.display());
    }

    #[test]
    fn test_renders_aggregate_and_entity_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            record("TitForTat", &[0.0, 0.0, 10.0, 0.5, 0.1, 8.0]),
            record("AlwaysDefect", &[0.0, 0.0, 2.0, 0.5, 0.1, 1.0]),
            // Past the shared ranges on both axes.
            record("Grudger", &[0.2, 0.05, 4.0, 0.9, 0.3, 6.0]),
        ];
        let ranges = AxisRanges::from_record(&records[0]).unwrap();
        let mut renderer = PlottersRenderer::new((320, 240), DEFAULT_AGGREGATE_NAME);

        let aggregate = renderer
            .render_aggregate(dir.path(), &records, &ranges)
            .expect("aggregate render failed");
        assert_eq!(aggregate, chart_path(dir.path(), DEFAULT_AGGREGATE_NAME));
        assert_png(&aggregate);

        for record in &records {
            let path = renderer
                .render_entity(dir.path(), record, &ranges)
                .expect("entity render failed");
            assert_eq!(path, chart_path(dir.path(), record.name()));
            assert_png(&path);
        }
    }

    #[test]
    fn test_default_renderer_settings() {
        let renderer = PlottersRenderer::default();
        assert_eq!(renderer.aggregate_name(), "All Strategies");
        assert_eq!(renderer.size, (1280, 720));
    }
}
