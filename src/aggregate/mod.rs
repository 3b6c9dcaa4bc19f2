//! Per-language running accumulators and their merge algebra
//!
//! A [`RunningAggregate`] is owned by exactly one collector during the map
//! phase, so no locking is involved anywhere here. Finalizing an aggregate
//! compresses each ratio-metric sequence to its first two moments and
//! yields a [`LanguageSummary`], the unit persisted inside a partition
//! artifact and the operand of the reduce phase's merge.

pub mod ratio;

pub use ratio::{RatioMetric, RatioMoments};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ASCII punctuation; membership is a substring check, so multi-character
// tokens like "..." are kept as words.
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

fn is_punctuation(token: &str) -> bool {
    PUNCTUATION.contains(token)
}

/// Mutable per-language accumulator for one collector instance.
#[derive(Debug, Default)]
pub struct RunningAggregate {
    total_words: u64,
    total_docs: u64,
    total_bytes: u64,
    total_sentences: u64,
    length_histogram: BTreeMap<usize, u64>,
    word_histogram: BTreeMap<String, u64>,
    // One value per document per metric, in RatioMetric::ALL order.
    // Compressed to moments at finalize; never merged in raw form.
    ratio_values: [Vec<f64>; RatioMetric::ALL.len()],
}

impl RunningAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe one document.
    ///
    /// `tokens` are the raw tokenizer output; punctuation-only tokens are
    /// dropped here. Every ratio metric receives exactly one value per
    /// document, including zero-word documents (zero by policy), so the
    /// sequences always stay in lockstep with `total_docs`.
    pub fn update(&mut self, text: &str, tokens: &[String], sentences: &[String]) {
        let words: Vec<String> = tokens
            .iter()
            .filter(|token| !is_punctuation(token))
            .cloned()
            .collect();

        self.total_docs += 1;
        self.total_words += words.len() as u64;
        self.total_bytes += text.len() as u64;
        self.total_sentences += sentences.len() as u64;

        for word in &words {
            *self.length_histogram.entry(word.chars().count()).or_insert(0) += 1;
            *self.word_histogram.entry(word.to_lowercase()).or_insert(0) += 1;
        }

        for (slot, metric) in self.ratio_values.iter_mut().zip(RatioMetric::ALL) {
            slot.push(metric.compute(text, &words));
        }
    }

    pub fn total_docs(&self) -> u64 {
        self.total_docs
    }

    /// Finalize into the persistable summary, releasing the raw metric
    /// sequences.
    ///
    /// Word-histogram pruning (drop entries below `prune_threshold`)
    /// happens here and only here: it is lossy, so in-progress counts are
    /// never pruned mid-stream.
    pub fn finalize(self, prune_threshold: Option<u64>) -> LanguageSummary {
        let ratio_moments = self
            .ratio_values
            .iter()
            .zip(RatioMetric::ALL)
            .map(|(values, metric)| (metric.name().to_string(), RatioMoments::from_values(values)))
            .collect();

        let mut word_histogram = self.word_histogram;
        if let Some(threshold) = prune_threshold {
            word_histogram.retain(|_, count| *count >= threshold);
        }

        LanguageSummary {
            total_words: self.total_words,
            total_docs: self.total_docs,
            total_bytes: self.total_bytes,
            total_sentences: self.total_sentences,
            length_histogram: self.length_histogram,
            word_histogram,
            ratio_moments,
        }
    }
}

/// Finalized statistics for one language in one partition.
///
/// The serialized form is self-describing: metric moments are keyed by
/// name, so the reducer never depends on worker count or metric order.
/// Invariant: each metric's moments were computed over exactly
/// `total_docs` values, and `total_docs` is the weight used when merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageSummary {
    pub total_words: u64,
    pub total_docs: u64,
    pub total_bytes: u64,
    #[serde(default)]
    pub total_sentences: u64,
    pub length_histogram: BTreeMap<usize, u64>,
    pub word_histogram: BTreeMap<String, u64>,
    pub ratio_moments: BTreeMap<String, RatioMoments>,
}

impl LanguageSummary {
    /// Merge another partition's summary for the same language into this
    /// one. Commutative and associative up to floating-point rounding:
    /// histograms and counters add exactly, moments combine weighted by
    /// each side's pre-merge document count.
    pub fn merge(&mut self, other: &LanguageSummary) {
        let weight_self = self.total_docs;
        let weight_other = other.total_docs;

        self.total_words += other.total_words;
        self.total_docs += other.total_docs;
        self.total_bytes += other.total_bytes;
        self.total_sentences += other.total_sentences;

        for (length, count) in &other.length_histogram {
            *self.length_histogram.entry(*length).or_insert(0) += count;
        }
        for (word, count) in &other.word_histogram {
            *self.word_histogram.entry(word.clone()).or_insert(0) += count;
        }

        // Deduplicated key union: a metric present on both sides must be
        // combined exactly once.
        let names: BTreeSet<String> = self
            .ratio_moments
            .keys()
            .chain(other.ratio_moments.keys())
            .cloned()
            .collect();
        for name in names {
            let a = self.ratio_moments.get(&name).copied().unwrap_or_default();
            let b = other.ratio_moments.get(&name).copied().unwrap_or_default();
            self.ratio_moments
                .insert(name, RatioMoments::combine(a, weight_self, b, weight_other));
        }
    }
}
