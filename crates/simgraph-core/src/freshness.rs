//! Build freshness check based on file modification times.

use std::path::Path;
use std::time::SystemTime;

use crate::domain::{BuildTarget, FreshnessPolicy, HarnessError, Result};

/// Whether `artifact` must be rebuilt from `source`.
///
/// A missing artifact always needs a rebuild. Otherwise the artifact is
/// stale only when the source is strictly newer; equal timestamps count as
/// up to date.
pub fn needs_rebuild(source: &Path, artifact: &Path) -> Result<bool> {
    let Some(artifact_mtime) = modified_if_exists(artifact)? else {
        return Ok(true);
    };
    Ok(modified(source)? > artifact_mtime)
}

impl BuildTarget {
    /// Whether the artifact is stale relative to the sources `policy` tracks.
    pub fn needs_rebuild(&self, policy: FreshnessPolicy) -> Result<bool> {
        for source in self.tracked_sources(policy) {
            if needs_rebuild(source, &self.artifact)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn modified_if_exists(path: &Path) -> Result<Option<SystemTime>> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.modified()?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn modified(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| {
            HarnessError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            ))
        })
}
