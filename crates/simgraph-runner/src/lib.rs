//! simgraph runner - drives the simulation harness
//!
//! Provides the pipeline orchestrator that:
//! - Rebuilds the simulation when its sources are newer than the binary
//! - Runs the binary and decodes its output as it streams
//! - Renders one aggregate chart and one chart per strategy
//! - Stops child processes cleanly on an operator interrupt

pub mod build;
pub mod config;
pub mod pipeline;
pub mod process;
pub mod shutdown;
pub mod simulation;

// Re-export key types
pub use build::{BuildCommand, BuildOutcome, BuildReport, BuildRunner, ProcessCompiler};
pub use config::HarnessConfig;
pub use pipeline::{HarnessPipeline, PipelineOutcome, PipelineResult};
pub use shutdown::Shutdown;
pub use simulation::{SimulationCommand, SimulationOutcome, SimulationReport, SimulationRunner};
