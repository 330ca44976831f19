//! Git integration for labeling run output by the latest commit.

use std::path::Path;
use std::process::Command;

use tracing::warn;

use crate::domain::error::{HarnessError, Result};

/// Label used when the latest commit message cannot be read.
pub const UNKNOWN_COMMIT_LABEL: &str = "Unknown Commit";

/// Read the full message of the most recent commit.
///
/// Runs `git log -1 --pretty=%B` in the given directory. Returns an error if
/// git is not available, the directory is not inside a repository, or the
/// message is empty.
pub fn latest_commit_message(repo_dir: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(["log", "-1", "--pretty=%B"])
        .current_dir(repo_dir)
        .output()
        .map_err(|e| HarnessError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(HarnessError::GitError(format!(
            "git log -1 failed: {}",
            stderr.trim()
        )));
    }

    let message = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if message.is_empty() {
        return Err(HarnessError::GitError(
            "git log -1 returned an empty message".to_string(),
        ));
    }

    Ok(message)
}

/// Commit label for the run directory: the subject line of the latest
/// commit, or [`UNKNOWN_COMMIT_LABEL`] when it cannot be read.
pub fn commit_label(repo_dir: &Path) -> String {
    match latest_commit_message(repo_dir) {
        Ok(message) => subject_line(&message).to_string(),
        Err(e) => {
            warn!(error = %e, "Could not read latest commit, using placeholder label");
            UNKNOWN_COMMIT_LABEL.to_string()
        }
    }
}

fn subject_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn run_git(repo_dir: &Path, args: &[&str]) {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(repo_dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn make_git_repo(message: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init"]);
        run_git(dir.path(), &["config", "user.name", "test-user"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["commit", "--allow-empty", "-m", message]);
        dir
    }

    #[test]
    fn latest_commit_message_reads_full_message() {
        let repo = make_git_repo("Tune misexecution rates\n\nLonger body text.");
        let message = latest_commit_message(repo.path()).unwrap();
        assert!(message.starts_with("Tune misexecution rates"));
        assert!(message.contains("Longer body text."));
    }

    #[test]
    fn commit_label_uses_subject_line() {
        let repo = make_git_repo("Tune misexecution rates\n\nLonger body text.");
        assert_eq!(commit_label(repo.path()), "Tune misexecution rates");
    }

    #[test]
    fn latest_commit_message_fails_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert!(latest_commit_message(dir.path()).is_err());
    }

    #[test]
    fn commit_label_falls_back_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(commit_label(dir.path()), UNKNOWN_COMMIT_LABEL);
    }

    #[test]
    fn subject_line_of_multiline_message() {
        assert_eq!(subject_line("  first \nsecond"), "first");
        assert_eq!(subject_line(""), "");
    }
}
