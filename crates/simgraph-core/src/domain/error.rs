//! Error taxonomy for simgraph.

use std::path::PathBuf;

/// Errors produced while decoding a line of simulation output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: data line has no name field")]
    MissingName { line: usize },

    #[error("line {line}: field {field} is not a number: {value:?}")]
    InvalidNumber {
        line: usize,
        field: usize,
        value: String,
    },

    #[error("line {line}: record {name} has {values} values, expected a multiple of 3")]
    IncompleteTriplet {
        line: usize,
        name: String,
        values: usize,
    },
}

/// Which value sequence an axis range is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Miscommunication,
    Misexecution,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Miscommunication => write!(f, "miscommunication"),
            Axis::Misexecution => write!(f, "misexecution"),
        }
    }
}

/// simgraph pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("compiler not found at {path}: {reason}")]
    CompilerNotFound { path: PathBuf, reason: String },

    #[error("build failed with exit code {exit_code}:\n{stderr}")]
    BuildFailed { exit_code: i32, stderr: String },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed simulation output: {0}")]
    Parse(#[from] ParseError),

    #[error("simulation produced no data records")]
    NoRecords,

    #[error("record {name} has no {axis} values to derive an axis range from")]
    EmptyAxis { name: String, axis: Axis },

    #[error("render error: {0}")]
    Render(String),

    #[error("git error: {0}")]
    GitError(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for simgraph operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_failed_display_includes_stderr() {
        let err = HarnessError::BuildFailed {
            exit_code: 1,
            stderr: "main.cpp:3: error: expected ';'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("expected ';'"));
    }

    #[test]
    fn test_parse_error_converts() {
        let err: HarnessError = ParseError::InvalidNumber {
            line: 4,
            field: 2,
            value: "abc".to_string(),
        }
        .into();
        assert!(matches!(err, HarnessError::Parse(_)));
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_empty_axis_names_record_and_axis() {
        let err = HarnessError::EmptyAxis {
            name: "TitForTat".to_string(),
            axis: Axis::Misexecution,
        };
        let msg = err.to_string();
        assert!(msg.contains("TitForTat"));
        assert!(msg.contains("misexecution"));
    }
}
