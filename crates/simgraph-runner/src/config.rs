//! Harness configuration.

use serde::{Deserialize, Serialize};
use simgraph_core::{
    BuildTarget, FreshnessPolicy, HarnessError, LineParser, PlottersRenderer, Result,
    DEFAULT_AGGREGATE_NAME, DEFAULT_NOTICE_MARKER,
};
use std::path::{Path, PathBuf};

use crate::build::BuildCommand;
use crate::simulation::SimulationCommand;

/// Configuration of one harness run.
///
/// Relative paths are resolved against `project_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct HarnessConfig {
    /// Directory holding the sources; also the git repository queried for
    /// the commit label.
    pub project_dir: PathBuf,

    /// Compiler executable. Bare names are looked up on `PATH`.
    pub compiler: PathBuf,

    /// First compiler flag (empty to omit).
    pub diagnostic_flag: String,

    /// Second compiler flag (empty to omit).
    pub debug_flag: String,

    /// Source passed first to the compiler.
    pub primary_source: PathBuf,

    /// Additional sources linked into the simulation.
    pub linked_sources: Vec<PathBuf>,

    /// Compiled simulation binary.
    pub artifact: PathBuf,

    /// Arguments passed to the simulation (none by default).
    pub simulation_args: Vec<String>,

    /// Root of the chart output tree.
    pub workspace_dir: PathBuf,

    /// Token marking notice lines in the simulation output.
    pub notice_marker: String,

    /// Sources considered by the freshness check.
    pub freshness: FreshnessPolicy,

    /// Title and file stem of the aggregate chart.
    pub aggregate_chart_name: String,

    /// Chart width in pixels.
    pub chart_width: u32,

    /// Chart height in pixels.
    pub chart_height: u32,

    /// Write `run.json` next to the charts.
    pub write_manifest: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            compiler: PathBuf::from("g++"),
            diagnostic_flag: "-fdiagnostics-color=always".to_string(),
            debug_flag: "-g".to_string(),
            primary_source: PathBuf::from("iterated-prisoners-dilemma.cpp"),
            linked_sources: vec![PathBuf::from("helper.cpp"), PathBuf::from("strategy.cpp")],
            artifact: PathBuf::from(format!(
                "iterated-prisoners-dilemma{}",
                std::env::consts::EXE_SUFFIX
            )),
            simulation_args: Vec::new(),
            workspace_dir: PathBuf::from("Graphs"),
            notice_marker: DEFAULT_NOTICE_MARKER.to_string(),
            freshness: FreshnessPolicy::PrimaryOnly,
            aggregate_chart_name: DEFAULT_AGGREGATE_NAME.to_string(),
            chart_width: 1280,
            chart_height: 720,
            write_manifest: true,
        }
    }
}

impl HarnessConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| HarnessError::Config(e.to_string()))
    }

    /// Load a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve `path` against the project directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// Locate the compiler executable.
    ///
    /// Paths with a directory component are resolved against the project
    /// directory and must exist; bare names are searched on `PATH`.
    pub fn resolve_compiler(&self) -> Result<PathBuf> {
        let not_found = |reason: String| HarnessError::CompilerNotFound {
            path: self.compiler.clone(),
            reason,
        };

        if self.compiler.components().count() > 1 || self.compiler.is_absolute() {
            let path = self.resolve(&self.compiler);
            if path.is_file() {
                Ok(path)
            } else {
                Err(not_found("no such file".to_string()))
            }
        } else {
            which::which(&self.compiler).map_err(|e| not_found(e.to_string()))
        }
    }

    /// The artifact and its sources, with resolved paths.
    pub fn build_target(&self) -> BuildTarget {
        BuildTarget::new(self.resolve(&self.primary_source), self.resolve(&self.artifact))
            .with_linked_sources(self.linked_sources.iter().map(|p| self.resolve(p)))
    }

    /// Compiler invocation for the configured target.
    pub fn build_command(&self, compiler: &Path) -> BuildCommand {
        let flags = [&self.diagnostic_flag, &self.debug_flag];
        BuildCommand::new(
            compiler,
            flags.iter().filter(|f| !f.is_empty()).map(|f| f.as_str()),
            &self.build_target(),
            &self.project_dir,
        )
    }

    /// Simulation invocation; the artifact path is never looked up on `PATH`.
    pub fn simulation_command(&self) -> SimulationCommand {
        SimulationCommand::new(self.resolve(&self.artifact), &self.project_dir)
            .with_args(self.simulation_args.iter().cloned())
    }

    pub fn output_root(&self) -> PathBuf {
        self.resolve(&self.workspace_dir)
    }

    pub fn line_parser(&self) -> LineParser {
        LineParser::new(self.notice_marker.clone())
    }

    pub fn renderer(&self) -> PlottersRenderer {
        PlottersRenderer::new(
            (self.chart_width, self.chart_height),
            self.aggregate_chart_name.clone(),
        )
    }
}
