//! Build → run → parse → chart pipeline.

use chrono::Local;
use simgraph_core::obs::{emit_build_skipped, emit_run_finished, emit_run_interrupted};
use simgraph_core::{
    commit_label, create_run_directory, run_span, write_run_manifest, ChartPlan, ChartRenderer,
    Result, RunManifest,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::build::{BuildOutcome, BuildRunner};
use crate::config::HarnessConfig;
use crate::shutdown::Shutdown;
use crate::simulation::{SimulationOutcome, SimulationRunner};

/// Outputs of a run that reached the end.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub run_id: Uuid,

    /// Directory holding the charts.
    pub output_dir: PathBuf,

    pub commit_label: String,

    /// Record names in emission order.
    pub record_names: Vec<String>,

    /// Chart paths in render order, aggregate first.
    pub charts: Vec<PathBuf>,

    pub manifest: Option<PathBuf>,

    /// Whether the compiler was invoked.
    pub rebuilt: bool,

    pub simulation_exit_code: Option<i32>,

    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Completed(PipelineResult),
    Interrupted,
}

/// End-to-end harness run.
pub struct HarnessPipeline;

impl HarnessPipeline {
    /// Run every phase once.
    ///
    /// `shutdown` is honored between phases and while a child process runs;
    /// an interrupted run creates no output directory.
    pub async fn run(
        config: &HarnessConfig,
        builder: &dyn BuildRunner,
        renderer: &mut dyn ChartRenderer,
        shutdown: &Shutdown,
    ) -> Result<PipelineOutcome> {
        let run_id = Uuid::new_v4();
        Self::run_phases(run_id, config, builder, renderer, shutdown)
            .instrument(run_span(&run_id.to_string()))
            .await
    }

    async fn run_phases(
        run_id: Uuid,
        config: &HarnessConfig,
        builder: &dyn BuildRunner,
        renderer: &mut dyn ChartRenderer,
        shutdown: &Shutdown,
    ) -> Result<PipelineOutcome> {
        let start = Instant::now();

        let compiler = config.resolve_compiler()?;
        let target = config.build_target();

        // Phase 1: build when stale
        let rebuilt = target.needs_rebuild(config.freshness)?;
        if rebuilt {
            let command = config.build_command(&compiler);
            match builder.build(&command, shutdown).await? {
                BuildOutcome::Finished(report) => {
                    report.into_result()?;
                }
                BuildOutcome::Interrupted => return Ok(interrupted("build")),
            }
        } else {
            emit_build_skipped(&target.artifact);
        }
        if shutdown.is_triggered() {
            return Ok(interrupted("build"));
        }

        // Label and timestamp are fixed before the simulation starts.
        let label = commit_label(&config.project_dir);
        let started_at = Local::now();

        // Phase 2: run and decode
        let report = match SimulationRunner::new()
            .run(&config.simulation_command(), config.line_parser(), shutdown)
            .await?
        {
            SimulationOutcome::Completed(report) => report,
            SimulationOutcome::Interrupted => return Ok(interrupted("simulation")),
        };
        if shutdown.is_triggered() {
            return Ok(interrupted("simulation"));
        }

        // Phase 3: charts
        let plan = ChartPlan::new(&report.records)?;
        let output_dir = create_run_directory(&config.output_root(), &label, started_at)?;
        info!(output_dir = %output_dir.display(), records = report.records.len(), "Rendering charts");
        let charts = plan.render(&output_dir, renderer)?;

        let record_names: Vec<String> = report.records.iter().map(|r| r.name().to_string()).collect();

        let manifest = if config.write_manifest {
            let manifest = RunManifest::new(
                run_id,
                label.clone(),
                record_names.clone(),
                *plan.ranges(),
                &charts,
            )
            .with_simulation(report.exit_code, report.notice_lines);
            Some(write_run_manifest(&output_dir, &manifest)?)
        } else {
            None
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        emit_run_finished(&output_dir, charts.len(), duration_ms);

        Ok(PipelineOutcome::Completed(PipelineResult {
            run_id,
            output_dir,
            commit_label: label,
            record_names,
            charts,
            manifest,
            rebuilt,
            simulation_exit_code: report.exit_code,
            duration_ms,
        }))
    }
}

fn interrupted(phase: &str) -> PipelineOutcome {
    emit_run_interrupted(phase);
    PipelineOutcome::Interrupted
}
