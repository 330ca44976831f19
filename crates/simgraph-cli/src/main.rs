//! simgraph - build, run and chart the prisoner's dilemma simulation
//!
//! A single invocation:
//!
//! - recompiles the simulation when its source is newer than the binary
//! - runs it and decodes the strategy results it prints
//! - renders `All Strategies.png` plus one chart per strategy into
//!   `<workspace>/<commit message>/<timestamp>/`
//!
//! Ctrl-C or SIGTERM stops the running child and exits cleanly.

use anyhow::{Context, Result};
use clap::Parser;
use simgraph_core::FreshnessPolicy;
use simgraph_runner::{HarnessConfig, HarnessPipeline, PipelineOutcome, ProcessCompiler, Shutdown};
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "simgraph")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build, run and chart the iterated prisoner's dilemma simulation", long_about = None)]
struct Cli {
    /// TOML configuration file; flags override its values
    #[arg(long, env = "SIMGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the sources (also queried for the commit label)
    #[arg(long, env = "SIMGRAPH_PROJECT_DIR")]
    project_dir: Option<PathBuf>,

    /// Compiler executable
    #[arg(long, env = "SIMGRAPH_COMPILER")]
    compiler: Option<PathBuf>,

    /// Primary source file
    #[arg(long, env = "SIMGRAPH_SOURCE")]
    source: Option<PathBuf>,

    /// Additional source to link (repeatable; replaces the configured list)
    #[arg(long = "link", env = "SIMGRAPH_LINK", value_delimiter = ',')]
    links: Vec<PathBuf>,

    /// Compiled simulation binary
    #[arg(long, env = "SIMGRAPH_ARTIFACT")]
    artifact: Option<PathBuf>,

    /// Root directory for chart output
    #[arg(long, env = "SIMGRAPH_WORKSPACE_DIR")]
    workspace_dir: Option<PathBuf>,

    /// Token marking informational lines in the simulation output
    #[arg(long, env = "SIMGRAPH_NOTICE_MARKER")]
    notice_marker: Option<String>,

    /// Rebuild when any linked source is newer than the binary
    #[arg(long, env = "SIMGRAPH_TRACK_LINKED_SOURCES")]
    track_linked_sources: bool,

    /// Do not write run.json next to the charts
    #[arg(long, env = "SIMGRAPH_NO_MANIFEST")]
    no_manifest: bool,

    /// Enable verbose output
    #[arg(short, long, env = "SIMGRAPH_VERBOSE")]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "SIMGRAPH_JSON")]
    json: bool,
}

impl Cli {
    /// Defaults, then the config file, then flags.
    fn harness_config(&self) -> Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => HarnessConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut HarnessConfig) {
        if let Some(dir) = &self.project_dir {
            config.project_dir = dir.clone();
        }
        if let Some(compiler) = &self.compiler {
            config.compiler = compiler.clone();
        }
        if let Some(source) = &self.source {
            config.primary_source = source.clone();
        }
        if !self.links.is_empty() {
            config.linked_sources = self.links.clone();
        }
        if let Some(artifact) = &self.artifact {
            config.artifact = artifact.clone();
        }
        if let Some(dir) = &self.workspace_dir {
            config.workspace_dir = dir.clone();
        }
        if let Some(marker) = &self.notice_marker {
            config.notice_marker = marker.clone();
        }
        if self.track_linked_sources {
            config.freshness = FreshnessPolicy::AllSources;
        }
        if self.no_manifest {
            config.write_manifest = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    simgraph_core::init_tracing(cli.json, level);

    let config = cli.harness_config()?;

    let shutdown = Shutdown::new();
    let listener = shutdown.spawn_signal_listener();

    let mut renderer = config.renderer();
    let outcome = HarnessPipeline::run(&config, &ProcessCompiler, &mut renderer, &shutdown)
        .await
        .context("Simulation run failed")?;
    listener.abort();

    match outcome {
        PipelineOutcome::Completed(result) => {
            info!(
                run_id = %result.run_id,
                charts = result.charts.len(),
                rebuilt = result.rebuilt,
                "Run complete"
            );
            println!("Graphs successfully saved in: {}", result.output_dir.display());
        }
        PipelineOutcome::Interrupted => {
            println!("Interrupted, no graphs written");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("simgraph").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_no_flags_keeps_defaults() {
        let config = parse(&[]).harness_config().unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "--project-dir",
            "/work/ipd",
            "--compiler",
            "clang++",
            "--source",
            "main.cpp",
            "--link",
            "a.cpp",
            "--link",
            "b.cpp",
            "--workspace-dir",
            "charts",
            "--notice-marker",
            "##",
            "--track-linked-sources",
            "--no-manifest",
        ]);
        let config = cli.harness_config().unwrap();

        assert_eq!(config.project_dir, PathBuf::from("/work/ipd"));
        assert_eq!(config.compiler, PathBuf::from("clang++"));
        assert_eq!(config.primary_source, PathBuf::from("main.cpp"));
        assert_eq!(
            config.linked_sources,
            vec![PathBuf::from("a.cpp"), PathBuf::from("b.cpp")]
        );
        assert_eq!(config.workspace_dir, PathBuf::from("charts"));
        assert_eq!(config.notice_marker, "##");
        assert_eq!(config.freshness, FreshnessPolicy::AllSources);
        assert!(!config.write_manifest);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simgraph.toml");
        std::fs::write(
            &path,
            "compiler = \"clang++\"\nworkspace-dir = \"out\"\nchart-width = 800\n",
        )
        .unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let cli = parse(&["--config", &path_arg, "--workspace-dir", "charts"]);
        let config = cli.harness_config().unwrap();

        assert_eq!(config.compiler, PathBuf::from("clang++"));
        assert_eq!(config.workspace_dir, PathBuf::from("charts"));
        assert_eq!(config.chart_width, 800);
    }

    #[test]
    fn test_bad_config_file_is_error() {
        let cli = parse(&["--config", "/nonexistent/simgraph.toml"]);
        let err = cli.harness_config().unwrap_err();
        assert!(format!("{err:#}").contains("simgraph.toml"));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["simgraph", "--no-such-flag"]).is_err());
    }
}
