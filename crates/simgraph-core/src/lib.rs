//! simgraph core library
//!
//! Building blocks of the build → run → parse → chart pipeline:
//! - Build freshness check on file modification times
//! - Line decoder for the simulation's CSV-like output
//! - Chart aggregation with axis ranges shared across every chart
//! - Output layout, run manifest and structured logging

pub mod aggregate;
pub mod domain;
pub mod fakes;
pub mod freshness;
pub mod git;
pub mod layout;
pub mod obs;
pub mod parser;
pub mod render;
pub mod reporting;
pub mod telemetry;

pub use aggregate::ChartPlan;
pub use domain::{
    Axis, AxisRange, AxisRanges, BuildTarget, DataRecord, FreshnessPolicy, HarnessError,
    ParseError, Result,
};
pub use freshness::needs_rebuild;
pub use git::{commit_label, latest_commit_message, UNKNOWN_COMMIT_LABEL};
pub use layout::{chart_path, create_run_directory, run_directory, sanitize_component};
pub use obs::run_span;
pub use parser::{parse_output, LineParser, ParsedLine, Pushed, RecordCollector, DEFAULT_NOTICE_MARKER};
pub use render::{ChartRenderer, PlottersRenderer, DEFAULT_AGGREGATE_NAME};
pub use reporting::{write_run_manifest, RunManifest, MANIFEST_FILE_NAME};
pub use telemetry::init_tracing;

/// simgraph version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
