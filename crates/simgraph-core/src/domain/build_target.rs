//! Compiled artifact definition.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which sources participate in the freshness comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreshnessPolicy {
    /// Only the primary source is compared against the artifact.
    #[default]
    PrimaryOnly,

    /// The primary source and every linked source are compared.
    AllSources,
}

/// A compiled artifact and the sources it is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    /// Source passed first to the compiler.
    pub primary_source: PathBuf,

    /// Additional sources linked into the artifact, in command-line order.
    pub linked_sources: Vec<PathBuf>,

    /// Compiled output location.
    pub artifact: PathBuf,
}

impl BuildTarget {
    pub fn new(primary_source: impl Into<PathBuf>, artifact: impl Into<PathBuf>) -> Self {
        Self {
            primary_source: primary_source.into(),
            linked_sources: Vec::new(),
            artifact: artifact.into(),
        }
    }

    pub fn with_linked_sources<I, P>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.linked_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// All sources in compiler order: primary first.
    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.primary_source.as_path())
            .chain(self.linked_sources.iter().map(PathBuf::as_path))
    }

    /// Sources whose timestamps decide freshness under `policy`.
    pub fn tracked_sources(&self, policy: FreshnessPolicy) -> Vec<&Path> {
        match policy {
            FreshnessPolicy::PrimaryOnly => vec![self.primary_source.as_path()],
            FreshnessPolicy::AllSources => self.sources().collect(),
        }
    }
}
