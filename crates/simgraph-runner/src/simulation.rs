//! Simulation process and streaming decode of its output.

use simgraph_core::obs::{
    emit_notice, emit_record_parsed, emit_simulation_finished, emit_simulation_started,
    emit_simulation_stderr,
};
use simgraph_core::{DataRecord, HarnessError, LineParser, Pushed, RecordCollector, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::process::terminate;
use crate::shutdown::Shutdown;

/// Invocation of the compiled simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
}

impl SimulationCommand {
    pub fn new(program: impl Into<PathBuf>, working_dir: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.to_path_buf(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// What the simulation produced before its output stream closed.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Records in emission order.
    pub records: Vec<DataRecord>,

    /// `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,

    pub notice_lines: usize,

    /// Every stdout line read, blanks and notices included.
    pub output_lines: usize,

    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub enum SimulationOutcome {
    Completed(SimulationReport),
    Interrupted,
}

/// Runs the simulation and decodes stdout line by line as it arrives.
#[derive(Debug, Clone, Default)]
pub struct SimulationRunner;

impl SimulationRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run `command` until its stdout closes.
    ///
    /// A malformed data line terminates the process and fails the run. A
    /// shutdown request terminates the process and yields
    /// [`SimulationOutcome::Interrupted`].
    pub async fn run(
        &self,
        command: &SimulationCommand,
        parser: LineParser,
        shutdown: &Shutdown,
    ) -> Result<SimulationOutcome> {
        let start = Instant::now();
        emit_simulation_started(&command.program);

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

        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if !line.trim().is_empty() {
                        emit_simulation_stderr(&line);
                    }
                }
            })
        });

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Io(std::io::Error::other("simulation stdout not captured")))?;
        let mut lines = BufReader::new(stdout).lines();
        let mut collector = RecordCollector::new(parser);

        loop {
            let line = tokio::select! {
                biased;
                _ = shutdown.triggered() => {
                    terminate(&mut child).await?;
                    abort_stderr(stderr_task);
                    return Ok(SimulationOutcome::Interrupted);
                }
                line = lines.next_line() => line,
            };

            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    terminate(&mut child).await?;
                    abort_stderr(stderr_task);
                    return Err(e.into());
                }
            };

            match collector.push_line(&line) {
                Ok(Pushed::Blank) => {}
                Ok(Pushed::Notice(text)) => emit_notice(&text),
                Ok(Pushed::Record(record)) => {
                    emit_record_parsed(record.name(), record.len(), &line)
                }
                Err(e) => {
                    terminate(&mut child).await?;
                    abort_stderr(stderr_task);
                    return Err(e.into());
                }
            }
        }
        drop(lines);

        // The child may keep running, or hold stderr open, after closing stdout.
        let status = tokio::select! {
            biased;
            _ = shutdown.triggered() => {
                terminate(&mut child).await?;
                abort_stderr(stderr_task);
                return Ok(SimulationOutcome::Interrupted);
            }
            status = child.wait() => status?,
        };
        if let Some(mut task) = stderr_task {
            tokio::select! {
                biased;
                _ = shutdown.triggered() => {
                    task.abort();
                    return Ok(SimulationOutcome::Interrupted);
                }
                _ = &mut task => {}
            }
        }

        let notice_lines = collector.notice_count();
        let output_lines = collector.lines_seen();
        let records = collector.into_records();
        let code = status.code();
        emit_simulation_finished(records.len(), code);

        Ok(SimulationOutcome::Completed(SimulationReport {
            records,
            exit_code: code,
            notice_lines,
            output_lines,
            duration_ms: start.elapsed().as_millis() as u64,
        }))
    }
}

fn abort_stderr(task: Option<JoinHandle<()>>) {
    if let Some(task) = task {
        task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simgraph_core::ParseError;
    use std::time::Duration;

    fn sh(script: &str) -> SimulationCommand {
        SimulationCommand::new("sh", Path::new(".")).with_args(["-c", script])
    }

    async fn run(script: &str) -> Result<SimulationOutcome> {
        SimulationRunner::new()
            .run(&sh(script), LineParser::default(), &Shutdown::new())
            .await
    }

    fn completed(outcome: SimulationOutcome) -> SimulationReport {
        match outcome {
            SimulationOutcome::Completed(report) => report,
            SimulationOutcome::Interrupted => panic!("unexpected interrupt"),
        }
    }

    #[tokio::test]
    async fn test_records_in_emission_order() {
        let report = completed(
            run("printf 'TitForTat, 0.0, 0.0, 3.0, 0.5, 0.1, 2.1\\nAlwaysDefect, 0.0, 0.0, 1.0\\n'")
                .await
                .expect("run"),
        );

        let names: Vec<_> = report.records.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["TitForTat", "AlwaysDefect"]);
        assert_eq!(report.records[0].len(), 2);
        assert_eq!(report.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_notices_and_blanks_are_not_records() {
        let report = completed(
            run("echo '[NOTICE] Round 1 complete'; echo; echo 'Grudger, 0.1, 0.1, 2.5'")
                .await
                .expect("run"),
        );
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.notice_lines, 1);
        assert_eq!(report.output_lines, 3);
    }

    #[tokio::test]
    async fn test_no_output_completes_empty() {
        let report = completed(run("true").await.expect("run"));
        assert!(report.records.is_empty());
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_fatal() {
        let report = completed(run("echo 'Random, 0, 0, 1'; exit 4").await.expect("run"));
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.exit_code, Some(4));
    }

    #[tokio::test]
    async fn test_malformed_line_fails_and_stops_process() {
        let start = Instant::now();
        let err = run("echo 'TitForTat, 0.0, oops, 3.0'; exec sleep 30")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HarnessError::Parse(ParseError::InvalidNumber { line: 1, .. })
        ));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_interrupt_terminates_simulation() {
        let shutdown = Shutdown::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.trigger();
        });

        let outcome = SimulationRunner::new()
            .run(
                &sh("echo 'TitForTat, 0, 0, 3'; exec sleep 30"),
                LineParser::default(),
                &shutdown,
            )
            .await
            .expect("run");
        assert!(matches!(outcome, SimulationOutcome::Interrupted));
    }

    async fn run_interrupted_after(script: &str, delay: Duration) -> (SimulationOutcome, Duration) {
        let shutdown = Shutdown::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trigger.trigger();
        });

        let start = Instant::now();
        let outcome = SimulationRunner::new()
            .run(&sh(script), LineParser::default(), &shutdown)
            .await
            .expect("run");
        (outcome, start.elapsed())
    }

    #[tokio::test]
    async fn test_interrupt_after_stdout_closed_terminates_simulation() {
        let (outcome, elapsed) = run_interrupted_after(
            "echo 'TitForTat, 0, 0, 1'; exec 1>&-; exec sleep 30",
            Duration::from_millis(300),
        )
        .await;

        assert!(matches!(outcome, SimulationOutcome::Interrupted));
        assert!(elapsed < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_interrupt_while_stderr_held_open() {
        // The background sleep keeps stderr open after the shell exits.
        let (outcome, elapsed) = run_interrupted_after(
            "echo 'TitForTat, 0, 0, 1'; (exec 1>&-; sleep 5) &",
            Duration::from_millis(300),
        )
        .await;

        assert!(matches!(outcome, SimulationOutcome::Interrupted));
        assert!(elapsed < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_missing_artifact_is_spawn_error() {
        let command = SimulationCommand::new("/nonexistent/iterated-prisoners-dilemma", Path::new("."));
        let err = SimulationRunner::new()
            .run(&command, LineParser::default(), &Shutdown::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::Spawn { .. }));
    }
}
