//! Ratio metrics and their combinable moments
//!
//! Every ratio metric is a per-document scalar. During collection the raw
//! per-document values are kept; at finalize time they are compressed to
//! `(mean, mean_of_squares)`. Mean-of-squares, not std, is what gets
//! persisted: both moments combine linearly across partitions when
//! weighted by document count, which is what makes the reduce phase
//! possible without ever seeing the raw values again.

use serde::{Deserialize, Serialize};

/// The fixed set of per-document ratio metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioMetric {
    /// `#` characters per word.
    HashWord,
    /// Ellipses (`...` or `…`) per word.
    EllipsisWord,
    /// Fraction of lines starting with a bullet (`•` or `-`).
    BulletStart,
    /// Fraction of lines ending in an ellipsis.
    EllipsisEnd,
    /// Fraction of words containing at least one alphabetic character.
    AlphaWords,
}

impl RatioMetric {
    pub const ALL: [RatioMetric; 5] = [
        RatioMetric::HashWord,
        RatioMetric::EllipsisWord,
        RatioMetric::BulletStart,
        RatioMetric::EllipsisEnd,
        RatioMetric::AlphaWords,
    ];

    /// Stable name used as the key in artifacts and reports.
    pub fn name(&self) -> &'static str {
        match self {
            RatioMetric::HashWord => "hash_word_ratio",
            RatioMetric::EllipsisWord => "ellipsis_word_ratio",
            RatioMetric::BulletStart => "bullet_start_ratio",
            RatioMetric::EllipsisEnd => "ellipsis_end_ratio",
            RatioMetric::AlphaWords => "alpha_ratio",
        }
    }

    /// Compute this metric for one document.
    ///
    /// `words` must already have punctuation tokens filtered out. A zero
    /// denominator (no words, or no lines) yields `0.0` by policy, never
    /// NaN: downstream moment math requires a value for every document.
    pub fn compute(&self, text: &str, words: &[String]) -> f64 {
        match self {
            RatioMetric::HashWord => safe_ratio(text.matches('#').count(), words.len()),
            RatioMetric::EllipsisWord => safe_ratio(
                text.matches("...").count() + text.matches('…').count(),
                words.len(),
            ),
            RatioMetric::BulletStart => {
                let lines: Vec<&str> = text.lines().collect();
                let bullets = lines
                    .iter()
                    .filter(|line| line.trim_start().starts_with(['•', '-']))
                    .count();
                safe_ratio(bullets, lines.len())
            }
            RatioMetric::EllipsisEnd => {
                let lines: Vec<&str> = text.lines().collect();
                let ellipses = lines
                    .iter()
                    .filter(|line| {
                        let trimmed = line.trim_end();
                        trimmed.ends_with("...") || trimmed.ends_with('…')
                    })
                    .count();
                safe_ratio(ellipses, lines.len())
            }
            RatioMetric::AlphaWords => {
                let alpha = words
                    .iter()
                    .filter(|word| word.chars().any(char::is_alphabetic))
                    .count();
                safe_ratio(alpha, words.len())
            }
        }
    }
}

fn safe_ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// First and second moment of one metric over one partition.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatioMoments {
    pub mean: f64,
    pub mean_sq: f64,
}

impl RatioMoments {
    /// Compress a sequence of per-document values into its moments.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        Self {
            mean: values.iter().sum::<f64>() / n,
            mean_sq: values.iter().map(|v| v * v).sum::<f64>() / n,
        }
    }

    /// Weighted combination of two partitions' moments.
    ///
    /// Weights are each side's document count, the same count the moments
    /// were computed over. Both moments combine by the same rule, which is
    /// what keeps the merge commutative and associative.
    pub fn combine(a: RatioMoments, weight_a: u64, b: RatioMoments, weight_b: u64) -> RatioMoments {
        // A zero-weight side contributes nothing; returning the other
        // side unchanged keeps the empty partition an exact identity.
        if weight_a == 0 {
            return b;
        }
        if weight_b == 0 {
            return a;
        }
        let total = weight_a + weight_b;
        let wa = weight_a as f64;
        let wb = weight_b as f64;
        let wt = total as f64;
        RatioMoments {
            mean: (wa * a.mean + wb * b.mean) / wt,
            mean_sq: (wa * a.mean_sq + wb * b.mean_sq) / wt,
        }
    }

    /// Standard deviation implied by the moments, guarded against the
    /// small negative variance that floating-point rounding can produce.
    pub fn std(&self) -> f64 {
        (self.mean_sq - self.mean * self.mean).max(0.0).sqrt()
    }
}
