//! Persisted partition snapshots
//!
//! One artifact per worker per run: a JSON map from language to its
//! finalized [`LanguageSummary`]. Artifacts are immutable once written:
//! the reducer reads them, it never rewrites them.

use crate::aggregate::LanguageSummary;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Finalized statistics for every language one worker saw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionArtifact {
    pub languages: BTreeMap<String, LanguageSummary>,
}

impl PartitionArtifact {
    pub fn new(languages: BTreeMap<String, LanguageSummary>) -> Self {
        Self { languages }
    }

    /// Conventional artifact file name for a worker rank.
    pub fn file_name(rank: usize) -> String {
        format!("{rank:05}.json")
    }

    /// Write the artifact under `folder`, creating it if needed.
    pub fn save(&self, folder: &Path, rank: usize) -> Result<PathBuf> {
        std::fs::create_dir_all(folder)?;
        let path = folder.join(Self::file_name(rank));
        let content = serde_json::to_string(self)?;
        std::fs::write(&path, content)?;
        debug!("Saved partition artifact to {:?}", path);
        Ok(path)
    }

    /// Load an artifact file. Any read or parse failure is reported with
    /// the offending path; the reduce phase treats it as fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Artifact {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Artifact {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
