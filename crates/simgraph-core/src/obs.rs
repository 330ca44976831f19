//! Structured observability hooks for the simgraph run lifecycle.
//!
//! This module provides:
//! - A run-scoped tracing span (`run_span`)
//! - Emission functions for build, simulation and chart events
//!
//! Events are emitted at `info!` level unless noted otherwise.

use std::path::Path;

use tracing::{debug, info, warn};

/// Run-scoped span; every event emitted inside it carries the run id.
///
/// Attach it to async work with `tracing::Instrument`, or call `.entered()`
/// in synchronous code.
///
/// # Example
///
/// ```ignore
/// async { /* ... */ }.instrument(run_span("4f2c..."))
/// ```
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("simgraph.run", run_id = %run_id)
}

/// Emit event: the artifact is up to date, the compiler is not invoked.
pub fn emit_build_skipped(artifact: &Path) {
    info!(event = "build.skipped", artifact = %artifact.display(), "No changes detected, skipping build");
}

/// Emit event: the compiler was started.
pub fn emit_build_started(compiler: &Path, artifact: &Path) {
    info!(
        event = "build.started",
        compiler = %compiler.display(),
        artifact = %artifact.display(),
        "Building the simulation"
    );
}

/// Emit event: the compiler exited.
pub fn emit_build_finished(duration_ms: u64, exit_code: i32) {
    info!(
        event = "build.finished",
        duration_ms = duration_ms,
        exit_code = exit_code,
    );
}

/// Emit event: the simulation process was spawned.
pub fn emit_simulation_started(program: &Path) {
    info!(event = "simulation.started", program = %program.display());
}

/// Emit event: a notice line from the simulation, forwarded verbatim.
pub fn emit_notice(text: &str) {
    info!(event = "simulation.notice", "{text}");
}

/// Emit event: a data line was decoded; the raw line is the message (debug level).
pub fn emit_record_parsed(name: &str, steps: usize, line: &str) {
    debug!(event = "simulation.record", name = %name, steps = steps, "{line}");
}

/// Emit event: a line the simulation wrote to stderr (warn level).
pub fn emit_simulation_stderr(text: &str) {
    warn!(event = "simulation.stderr", "{text}");
}

/// Emit event: the simulation stream ended and the process was reaped.
pub fn emit_simulation_finished(records: usize, exit_code: Option<i32>) {
    match exit_code {
        Some(0) => info!(event = "simulation.finished", records = records, exit_code = 0),
        _ => warn!(
            event = "simulation.finished",
            records = records,
            exit_code = ?exit_code,
            "Simulation exited unsuccessfully"
        ),
    }
}

/// Emit event: a chart file was written.
pub fn emit_chart_written(chart: &str, path: &Path) {
    info!(event = "chart.written", chart = %chart, path = %path.display());
}

/// Emit event: the run stopped on an operator interrupt.
pub fn emit_run_interrupted(phase: &str) {
    warn!(event = "run.interrupted", phase = %phase, "Interrupt received, shutting down");
}

/// Emit event: the run finished with the given outputs.
pub fn emit_run_finished(output_dir: &Path, charts: usize, duration_ms: u64) {
    info!(
        event = "run.finished",
        output_dir = %output_dir.display(),
        charts = charts,
        duration_ms = duration_ms,
    );
}
