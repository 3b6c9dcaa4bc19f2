//! Sequential merge of partition artifacts into per-language reports
//!
//! The reduce phase is a single non-parallel instance: merging mutates one
//! accumulating map in place, so it cannot be partitioned further. It
//! discovers every artifact under the input folder, folds them per
//! language (order never matters: histogram addition and weighted moment
//! combination are both commutative and associative), derives the final
//! report, and writes one file per language.

use crate::aggregate::LanguageSummary;
use crate::artifact::PartitionArtifact;
use crate::error::{Error, Result};
use crate::report::{DerivationFn, GlobalStats};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Serialization format of the per-language report files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Yaml,
}

impl ReportFormat {
    fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Yaml => "yaml",
        }
    }
}

/// Single-instance reducer over a folder of partition artifacts.
pub struct StatsReducer {
    input_folder: PathBuf,
    output_folder: PathBuf,
    derivation: Option<DerivationFn>,
    top_k_words: Option<usize>,
    format: ReportFormat,
}

impl StatsReducer {
    pub fn new(input_folder: impl AsRef<Path>, output_folder: impl AsRef<Path>) -> Self {
        Self {
            input_folder: input_folder.as_ref().to_path_buf(),
            output_folder: output_folder.as_ref().to_path_buf(),
            derivation: None,
            top_k_words: None,
            format: ReportFormat::default(),
        }
    }

    /// Supply the derivation applied once per language. Without one, the
    /// merged [`GlobalStats`] are serialized as-is.
    pub fn with_derivation(mut self, derivation: DerivationFn) -> Self {
        self.derivation = Some(derivation);
        self
    }

    /// Truncate each merged word histogram to its k most frequent entries
    /// before derivation. Runs only after the full merge.
    pub fn with_top_k_words(mut self, k: usize) -> Self {
        self.top_k_words = Some(k);
        self
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Run the reduce phase.
    ///
    /// `world_size` is the worker count the caller's executor assigned to
    /// this stage; anything but 1 is a precondition violation rejected
    /// before any merge work starts. Returns the merged statistics per
    /// language after writing one report file per language.
    pub fn run(&self, world_size: usize) -> Result<BTreeMap<String, GlobalStats>> {
        if world_size != 1 {
            return Err(Error::ConcurrentReduce(world_size));
        }

        let paths = self.discover_artifacts()?;
        if paths.is_empty() {
            warn!("No partition artifacts found under {:?}", self.input_folder);
        }

        let mut merged: BTreeMap<String, LanguageSummary> = BTreeMap::new();
        for path in &paths {
            // A bad artifact aborts the whole run: histogram addition is
            // not idempotent against silent omission, so a partial merge
            // would change the result without signaling it.
            let artifact = PartitionArtifact::load(path)?;
            for (language, summary) in &artifact.languages {
                merged.entry(language.clone()).or_default().merge(summary);
            }
        }
        info!(
            "Merged {} artifacts covering {} languages",
            paths.len(),
            merged.len()
        );

        let mut reports = BTreeMap::new();
        std::fs::create_dir_all(&self.output_folder)?;
        for (language, summary) in merged {
            let stats = GlobalStats::from_merged(summary, self.top_k_words);
            let report = match &self.derivation {
                Some(derive) => derive(&stats),
                None => serde_json::to_value(&stats)?,
            };
            self.write_report(&language, &report)?;
            reports.insert(language, stats);
        }
        Ok(reports)
    }

    fn discover_artifacts(&self) -> Result<Vec<PathBuf>> {
        let pattern = self
            .input_folder
            .join("**")
            .join("*.json")
            .to_string_lossy()
            .into_owned();
        let entries = glob::glob(&pattern)
            .map_err(|e| Error::Config(format!("Bad artifact glob '{pattern}': {e}")))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::Artifact {
                path: e.path().to_path_buf(),
                message: e.to_string(),
            })?;
            paths.push(path);
        }
        paths.sort();
        Ok(paths)
    }

    fn write_report(&self, language: &str, report: &serde_json::Value) -> Result<()> {
        let path = self
            .output_folder
            .join(format!("{language}.{}", self.format.extension()));
        let content = match self.format {
            ReportFormat::Json => serde_json::to_string_pretty(report)?,
            ReportFormat::Yaml => serde_yaml::to_string(report)?,
        };
        std::fs::write(&path, content)?;
        debug!("Saved report for '{}' to {:?}", language, path);
        Ok(())
    }
}
