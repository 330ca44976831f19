//! Compiler invocation.

use async_trait::async_trait;
use simgraph_core::obs::{emit_build_finished, emit_build_started};
use simgraph_core::{BuildTarget, HarnessError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::warn;

use crate::process::{collect_pipe, exit_code, terminate};
use crate::shutdown::Shutdown;

/// Output flag preceding the artifact path.
pub const OUTPUT_FLAG: &str = "-o";

/// A fully resolved compiler command line.
///
/// Argument order: flags, primary source, linked sources, `-o`, artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    /// Compiler executable.
    pub program: PathBuf,

    /// Arguments after the executable.
    pub args: Vec<OsString>,

    /// Directory the compiler runs in.
    pub working_dir: PathBuf,

    /// Artifact the command produces.
    pub artifact: PathBuf,
}

impl BuildCommand {
    pub fn new<'a>(
        program: &Path,
        flags: impl IntoIterator<Item = &'a str>,
        target: &BuildTarget,
        working_dir: &Path,
    ) -> Self {
        let mut args: Vec<OsString> = flags.into_iter().map(OsString::from).collect();
        args.extend(target.sources().map(|s| s.as_os_str().to_owned()));
        args.push(OsString::from(OUTPUT_FLAG));
        args.push(target.artifact.as_os_str().to_owned());

        Self {
            program: program.to_path_buf(),
            args,
            working_dir: working_dir.to_path_buf(),
            artifact: target.artifact.clone(),
        }
    }

    /// Full command line, executable first, for display.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect()
    }
}

/// Result of a compiler run that exited on its own.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Exit code (0 = success).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl BuildReport {
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }

    /// Convert a non-zero exit into [`HarnessError::BuildFailed`].
    pub fn into_result(self) -> Result<Self> {
        if self.passed() {
            Ok(self)
        } else {
            Err(HarnessError::BuildFailed {
                exit_code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

/// How a build invocation ended.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    Finished(BuildReport),
    Interrupted,
}

/// Backend that turns a [`BuildCommand`] into an artifact.
#[async_trait]
pub trait BuildRunner: Send + Sync {
    /// Run the command to completion, or until `shutdown` is triggered.
    async fn build(&self, command: &BuildCommand, shutdown: &Shutdown) -> Result<BuildOutcome>;
}

/// Runs the compiler as a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCompiler;

#[async_trait]
impl BuildRunner for ProcessCompiler {
    async fn build(&self, command: &BuildCommand, shutdown: &Shutdown) -> Result<BuildOutcome> {
        let start = Instant::now();
        emit_build_started(&command.program, &command.artifact);

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                program: command.program.display().to_string(),
                source,
            })?;

        let stdout = collect_pipe(child.stdout.take());
        let stderr = collect_pipe(child.stderr.take());

        let status = tokio::select! {
            biased;
            _ = shutdown.triggered() => {
                terminate(&mut child).await?;
                stdout.abort();
                stderr.abort();
                discard_partial_artifact(&command.artifact).await?;
                return Ok(BuildOutcome::Interrupted);
            }
            status = child.wait() => status?,
        };

        let report = BuildReport {
            exit_code: exit_code(&status),
            stdout: stdout.await.unwrap_or_default(),
            stderr: stderr.await.unwrap_or_default(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        emit_build_finished(report.duration_ms, report.exit_code);

        if report.passed() && !report.stderr.trim().is_empty() {
            warn!(stderr = %report.stderr.trim_end(), "Compiler reported diagnostics");
        }

        Ok(BuildOutcome::Finished(report))
    }
}

/// Remove the output of an interrupted compiler; a partial artifact would
/// look fresh to the next freshness check.
async fn discard_partial_artifact(artifact: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(artifact).await {
        Ok(()) => {
            warn!(artifact = %artifact.display(), "Removed artifact of interrupted build");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
