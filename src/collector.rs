//! Pass-through statistics collection stage
//!
//! The collector sits inside a document pipeline: every input document is
//! observed (tokenized and folded into the per-language aggregates) and
//! then yielded unchanged downstream before the next one is pulled.
//! Statistics are a side effect; the data-flow contract is forwarding.
//! Collector instances never communicate, which is what lets the map
//! phase scale to any number of workers.

use crate::aggregate::RunningAggregate;
use crate::artifact::PartitionArtifact;
use crate::document::{Document, DEFAULT_LANGUAGE_FIELD};
use crate::error::Result;
use crate::tokenizer::TokenizerRegistry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Default word-count pruning threshold applied at artifact finalization.
pub const DEFAULT_WORD_COUNT_PRUNE: u64 = 2;

/// Per-worker statistics collector.
pub struct StatsCollector {
    output_folder: PathBuf,
    language_field: String,
    word_count_prune: Option<u64>,
    tokenizers: Arc<TokenizerRegistry>,
}

impl StatsCollector {
    pub fn new(output_folder: impl AsRef<Path>, tokenizers: Arc<TokenizerRegistry>) -> Self {
        Self {
            output_folder: output_folder.as_ref().to_path_buf(),
            language_field: DEFAULT_LANGUAGE_FIELD.to_string(),
            word_count_prune: Some(DEFAULT_WORD_COUNT_PRUNE),
            tokenizers,
        }
    }

    /// Use a different metadata field as the grouping key.
    pub fn with_language_field(mut self, field: impl Into<String>) -> Self {
        self.language_field = field.into();
        self
    }

    /// Override the finalize-time word-count pruning threshold.
    /// `None` disables pruning entirely.
    pub fn with_word_count_prune(mut self, threshold: Option<u64>) -> Self {
        self.word_count_prune = threshold;
        self
    }

    /// Start a collection run over `data` for worker `rank`.
    ///
    /// The returned [`CollectorRun`] is an iterator forwarding every
    /// document unchanged; drain it, then call
    /// [`CollectorRun::finish`] to persist the partition artifact.
    pub fn run<I>(&self, data: I, rank: usize) -> CollectorRun<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Document>,
    {
        CollectorRun {
            collector: self,
            inner: data.into_iter(),
            stats: HashMap::new(),
            rank,
        }
    }
}

/// An in-progress collection pass: pull documents out of it like any
/// iterator, then finish it to write the artifact.
pub struct CollectorRun<'a, I> {
    collector: &'a StatsCollector,
    inner: I,
    stats: HashMap<String, RunningAggregate>,
    rank: usize,
}

impl<I> CollectorRun<'_, I> {
    /// Finalize all aggregates and write this worker's artifact file.
    ///
    /// Only documents actually pulled through the iterator are counted;
    /// anything left in the upstream source was never consumed.
    pub fn finish(self) -> Result<PathBuf> {
        let docs: u64 = self.stats.values().map(RunningAggregate::total_docs).sum();
        let languages = self
            .stats
            .into_iter()
            .map(|(language, agg)| (language, agg.finalize(self.collector.word_count_prune)))
            .collect();
        let artifact = PartitionArtifact::new(languages);
        let path = artifact.save(&self.collector.output_folder, self.rank)?;
        info!(
            "Collector rank {} finished: {} documents across {} languages -> {:?}",
            self.rank,
            docs,
            artifact.languages.len(),
            path
        );
        Ok(path)
    }

    fn observe(&mut self, doc: &Document) {
        let language = doc.language(&self.collector.language_field).to_string();
        let tokenizer = self.collector.tokenizers.get(&language);
        // Tokenization of empty or degenerate text yields empty token
        // lists; the aggregate records zero-valued metrics for those, so
        // the document is still counted and still forwarded.
        let tokens = tokenizer.word_tokenize(&doc.text);
        let sentences = tokenizer.sent_tokenize(&doc.text);
        self.stats
            .entry(language)
            .or_default()
            .update(&doc.text, &tokens, &sentences);
    }
}

impl<I> Iterator for CollectorRun<'_, I>
where
    I: Iterator<Item = Document>,
{
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        let doc = self.inner.next()?;
        self.observe(&doc);
        Some(doc)
    }
}
