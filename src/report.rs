//! Merged statistics and the derivation layer
//!
//! [`GlobalStats`] is what the reduce phase hands to the caller: fully
//! merged histograms and counters plus `(mean, std)` per ratio metric.
//! A derivation function turns that into the final report; the helpers
//! here cover the usual derivations (weighted quantiles, stopword
//! candidate lists) and always operate on the fully merged histograms.
//! Quantiles do not combine across partitions, so they are only ever
//! computed after the merge.

use crate::aggregate::LanguageSummary;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Final `(mean, std)` of one ratio metric across the whole corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioSummary {
    pub mean: f64,
    pub std: f64,
}

/// Fully merged statistics for one language.
///
/// Ratio metrics are `None` when the merged document count is zero:
/// "no data" is explicitly distinct from "measured zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_words: u64,
    pub total_docs: u64,
    pub total_bytes: u64,
    pub total_sentences: u64,
    pub length_histogram: BTreeMap<usize, u64>,
    pub word_histogram: BTreeMap<String, u64>,
    pub ratio_metrics: BTreeMap<String, Option<RatioSummary>>,
}

impl GlobalStats {
    /// Derive the final statistics from a fully merged summary.
    ///
    /// `top_k_words` truncates the word histogram to the k most frequent
    /// entries. This runs strictly after the merge so that words rare in
    /// every partition but frequent globally are never lost.
    pub fn from_merged(summary: LanguageSummary, top_k_words: Option<usize>) -> Self {
        let defined = summary.total_docs > 0;
        let ratio_metrics = summary
            .ratio_moments
            .iter()
            .map(|(name, moments)| {
                let value = defined.then(|| RatioSummary {
                    mean: moments.mean,
                    std: moments.std(),
                });
                (name.clone(), value)
            })
            .collect();

        let word_histogram = match top_k_words {
            Some(k) => top_k_words_histogram(&summary.word_histogram, k),
            None => summary.word_histogram,
        };

        Self {
            total_words: summary.total_words,
            total_docs: summary.total_docs,
            total_bytes: summary.total_bytes,
            total_sentences: summary.total_sentences,
            length_histogram: summary.length_histogram,
            word_histogram,
            ratio_metrics,
        }
    }
}

/// Caller-supplied pure transform from merged statistics to a report.
/// Called exactly once per language by the reducer.
pub type DerivationFn = Arc<dyn Fn(&GlobalStats) -> serde_json::Value + Send + Sync>;

/// Weighted quantile over an integer-keyed histogram: the smallest key
/// whose cumulative count reaches fraction `q` of the total.
pub fn length_quantile(histogram: &BTreeMap<usize, u64>, q: f64) -> Option<usize> {
    let total: u64 = histogram.values().sum();
    if total == 0 {
        return None;
    }
    let target = q * total as f64;
    let mut cumulative = 0u64;
    let mut last = None;
    for (length, count) in histogram {
        last = Some(*length);
        cumulative += count;
        if cumulative as f64 >= target {
            return Some(*length);
        }
    }
    last
}

/// The most frequent words whose cumulative frequency stays below
/// fraction `q` of the total count.
pub fn words_covering_fraction(histogram: &BTreeMap<String, u64>, q: f64) -> Vec<String> {
    let total: u64 = histogram.values().sum();
    let target = q * total as f64;
    let mut cumulative = 0u64;
    let mut out = Vec::new();
    for (word, count) in sorted_by_frequency(histogram) {
        cumulative += count;
        if (cumulative as f64) < target {
            out.push(word.clone());
        } else {
            break;
        }
    }
    out
}

/// Words whose relative frequency exceeds `p`.
pub fn words_above_frequency(histogram: &BTreeMap<String, u64>, p: f64) -> Vec<String> {
    let total: u64 = histogram.values().sum();
    sorted_by_frequency(histogram)
        .into_iter()
        .filter(|(_, count)| **count as f64 > p * total as f64)
        .map(|(word, _)| word.clone())
        .collect()
}

/// The k most frequent words, in frequency order.
pub fn top_k_words(histogram: &BTreeMap<String, u64>, k: usize) -> Vec<String> {
    sorted_by_frequency(histogram)
        .into_iter()
        .take(k)
        .map(|(word, _)| word.clone())
        .collect()
}

/// Truncate a word histogram to its k most frequent entries.
pub fn top_k_words_histogram(histogram: &BTreeMap<String, u64>, k: usize) -> BTreeMap<String, u64> {
    sorted_by_frequency(histogram)
        .into_iter()
        .take(k)
        .map(|(word, count)| (word.clone(), *count))
        .collect()
}

/// Frequency-weighted mean and sample standard deviation of word length.
pub fn word_length_moments(histogram: &BTreeMap<usize, u64>) -> Option<(f64, f64)> {
    let total: u64 = histogram.values().sum();
    if total == 0 {
        return None;
    }
    let mean = histogram
        .iter()
        .map(|(length, count)| *length as f64 * *count as f64)
        .sum::<f64>()
        / total as f64;
    let std = if total > 1 {
        let ss = histogram
            .iter()
            .map(|(length, count)| {
                let d = *length as f64 - mean;
                d * d * *count as f64
            })
            .sum::<f64>();
        (ss / (total - 1) as f64).sqrt()
    } else {
        0.0
    };
    Some((mean, std))
}

// Count descending, then word ascending, so derivations are
// deterministic across runs.
fn sorted_by_frequency(histogram: &BTreeMap<String, u64>) -> Vec<(&String, &u64)> {
    let mut entries: Vec<_> = histogram.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
}

/// Reference derivation: word-length statistics and stopword candidate
/// lists computed from the merged histograms.
pub fn default_derivation(stats: &GlobalStats) -> serde_json::Value {
    let (length_mean, length_std) =
        word_length_moments(&stats.length_histogram).unwrap_or((0.0, 0.0));

    let mut length_quantiles = serde_json::Map::new();
    for i in 0..=20 {
        let q = i as f64 / 20.0;
        length_quantiles.insert(
            format!("{q:.2}"),
            json!(length_quantile(&stats.length_histogram, q)),
        );
    }

    let mut stopwords_q = serde_json::Map::new();
    for q in [0.1, 0.2, 0.3] {
        stopwords_q.insert(
            format!("{q:.2}"),
            json!(words_covering_fraction(&stats.word_histogram, q)),
        );
    }

    let mut stopwords_p_thresh = serde_json::Map::new();
    for p in [0.008, 0.012, 0.016] {
        stopwords_p_thresh.insert(
            format!("{p:.3}"),
            json!(words_above_frequency(&stats.word_histogram, p)),
        );
    }

    let mut stopwords_top_n = serde_json::Map::new();
    for n in [6usize, 8, 10] {
        stopwords_top_n.insert(n.to_string(), json!(top_k_words(&stats.word_histogram, n)));
    }

    json!({
        "total_docs": stats.total_docs,
        "total_words": stats.total_words,
        "total_bytes": stats.total_bytes,
        "total_sentences": stats.total_sentences,
        "word_length_mean": length_mean,
        "word_length_std": length_std,
        "min_avg_word_length": (length_mean - length_std).round() as i64,
        "max_avg_word_length": (length_mean + length_std).round() as i64,
        "word_length_q": length_quantiles,
        "stopwords_q": stopwords_q,
        "stopwords_p_thresh": stopwords_p_thresh,
        "stopwords_top_n": stopwords_top_n,
        "ratio_metrics": &stats.ratio_metrics,
    })
}
