//! Domain models for simgraph.
//!
//! - `BuildTarget`: a compiled artifact and its sources
//! - `DataRecord`: one entity's decoded simulation results
//! - `AxisRange` / `AxisRanges`: shared chart extents

pub mod build_target;
pub mod error;
pub mod record;

pub use build_target::{BuildTarget, FreshnessPolicy};
pub use error::{Axis, HarnessError, ParseError, Result};
pub use record::{AxisRange, AxisRanges, DataRecord};
