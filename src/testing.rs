//! Testing utilities and fixtures
//!
//! Shared by the unit tests and the integration suites under `tests/`.

use crate::collector::StatsCollector;
use crate::document::Document;
use crate::tokenizer::TokenizerRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build a document with the given text and language tag.
pub fn doc(text: &str, language: &str) -> Document {
    Document::new(text).with_metadata("language", language)
}

/// Run one unpruned collector pass over `shard` and persist the artifact
/// for `rank` under `folder`, returning its path.
pub fn collect_shard(folder: &Path, rank: usize, shard: Vec<Document>) -> PathBuf {
    let collector = StatsCollector::new(folder, Arc::new(TokenizerRegistry::default()))
        .with_word_count_prune(None);
    let mut run = collector.run(shard, rank);
    for _ in run.by_ref() {}
    run.finish().expect("collect_shard failed to write artifact")
}
