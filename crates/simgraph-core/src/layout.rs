//! Output directory layout: `<workspace>/<commit label>/<timestamp>/`.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::domain::Result;

/// `strftime` pattern of the per-run directory name.
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// File extension of rendered charts.
pub const CHART_EXTENSION: &str = "png";

/// Make `raw` usable as a single path component.
///
/// Separators, characters reserved on common filesystems and control
/// characters become `_`. Names that would resolve to the current or parent
/// directory are replaced as well.
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Directory a run started at `at` writes into.
pub fn run_directory(workspace: &Path, commit_label: &str, at: DateTime<Local>) -> PathBuf {
    workspace
        .join(sanitize_component(commit_label))
        .join(at.format(RUN_TIMESTAMP_FORMAT).to_string())
}

/// Resolve and create the run directory (parents included).
pub fn create_run_directory(
    workspace: &Path,
    commit_label: &str,
    at: DateTime<Local>,
) -> Result<PathBuf> {
    let dir = run_directory(workspace, commit_label, at);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Location of the chart named `name` inside `out_dir`.
pub fn chart_path(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join(format!("{}.{CHART_EXTENSION}", sanitize_component(name)))
}
