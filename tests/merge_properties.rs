//! Algebraic properties of the partition merge.

use langstats::aggregate::{LanguageSummary, RatioMetric, RunningAggregate};
use langstats::tokenizer::{WhitespaceTokenizer, WordTokenizer};

const CORPUS: &[&str] = &[
    "a a b",
    "# heading\nbody text here",
    "wait for it... done…",
    "• bullet one\n- bullet two\nplain line",
    "",
    "numbers 123 456 mixed a1b2",
    "trailing line...\nshort.\nlonger sentence with several words",
    "répétition répétition unicode héllo",
];

fn summarize(texts: &[&str]) -> LanguageSummary {
    let tokenizer = WhitespaceTokenizer;
    let mut agg = RunningAggregate::new();
    for text in texts {
        let words = tokenizer.word_tokenize(text);
        let sentences = tokenizer.sent_tokenize(text);
        agg.update(text, &words, &sentences);
    }
    agg.finalize(None)
}

fn merge_all(summaries: &[LanguageSummary]) -> LanguageSummary {
    let mut merged = LanguageSummary::default();
    for summary in summaries {
        merged.merge(summary);
    }
    merged
}

fn assert_moments_close(a: &LanguageSummary, b: &LanguageSummary) {
    for metric in RatioMetric::ALL {
        let x = a.ratio_moments[metric.name()];
        let y = b.ratio_moments[metric.name()];
        assert!(
            (x.mean - y.mean).abs() < 1e-9,
            "{} mean: {} vs {}",
            metric.name(),
            x.mean,
            y.mean
        );
        assert!(
            (x.mean_sq - y.mean_sq).abs() < 1e-9,
            "{} mean_sq: {} vs {}",
            metric.name(),
            x.mean_sq,
            y.mean_sq
        );
    }
}

/// Splitting the corpus into K shards and merging reproduces the
/// single-pass statistics, for several K.
#[test]
fn sharded_merge_equals_direct_computation() {
    let direct = summarize(CORPUS);

    for k in 1..=CORPUS.len() {
        let shards: Vec<LanguageSummary> = CORPUS
            .chunks(CORPUS.len().div_ceil(k))
            .map(summarize)
            .collect();
        let merged = merge_all(&shards);

        assert_eq!(merged.total_docs, direct.total_docs, "k={k}");
        assert_eq!(merged.total_words, direct.total_words, "k={k}");
        assert_eq!(merged.total_bytes, direct.total_bytes, "k={k}");
        assert_eq!(merged.length_histogram, direct.length_histogram, "k={k}");
        assert_eq!(merged.word_histogram, direct.word_histogram, "k={k}");
        assert_moments_close(&merged, &direct);
    }
}

/// Any permutation of the shards merges to the same result.
#[test]
fn merge_is_permutation_invariant() {
    let shards: Vec<LanguageSummary> = CORPUS.chunks(2).map(summarize).collect();
    let baseline = merge_all(&shards);

    let mut rotated = shards.clone();
    rotated.rotate_left(1);
    let merged_rotated = merge_all(&rotated);

    let mut reversed = shards.clone();
    reversed.reverse();
    let merged_reversed = merge_all(&reversed);

    for other in [&merged_rotated, &merged_reversed] {
        assert_eq!(other.word_histogram, baseline.word_histogram);
        assert_eq!(other.length_histogram, baseline.length_histogram);
        assert_eq!(other.total_docs, baseline.total_docs);
        assert_moments_close(other, &baseline);
    }
}

/// Pairwise regrouping — ((a+b)+(c+d)) vs (((a+b)+c)+d) — yields the
/// same result.
#[test]
fn merge_is_associative_under_regrouping() {
    let shards: Vec<LanguageSummary> = CORPUS.chunks(2).map(summarize).collect();
    assert!(shards.len() >= 4);

    let left_fold = merge_all(&shards);

    let mut ab = shards[0].clone();
    ab.merge(&shards[1]);
    let mut cd = shards[2].clone();
    cd.merge(&shards[3]);
    ab.merge(&cd);

    assert_eq!(ab.word_histogram, left_fold.word_histogram);
    assert_eq!(ab.length_histogram, left_fold.length_histogram);
    assert_moments_close(&ab, &left_fold);
}

/// No counts are lost or duplicated by the merge, prior to any pruning.
#[test]
fn histogram_counts_are_conserved() {
    let shards: Vec<LanguageSummary> = CORPUS.chunks(3).map(summarize).collect();
    let merged = merge_all(&shards);

    let shard_word_total: u64 = shards
        .iter()
        .flat_map(|s| s.word_histogram.values())
        .sum();
    let shard_length_total: u64 = shards
        .iter()
        .flat_map(|s| s.length_histogram.values())
        .sum();

    assert_eq!(merged.word_histogram.values().sum::<u64>(), shard_word_total);
    assert_eq!(
        merged.length_histogram.values().sum::<u64>(),
        shard_length_total
    );
    // Both histograms count filtered words, so they agree with the
    // word counter too.
    assert_eq!(shard_word_total, merged.total_words);
    assert_eq!(shard_length_total, merged.total_words);
}

/// A shard whose per-document metric values are constant contributes
/// zero variance; mixing it with an empty shard changes nothing.
#[test]
fn empty_shard_is_merge_identity() {
    let shard = summarize(&["a a b", "c d e"]);
    let empty = summarize(&[]);
    assert_eq!(empty.total_docs, 0);

    let mut merged = shard.clone();
    merged.merge(&empty);
    assert_eq!(merged, shard);

    let mut merged_flipped = empty;
    merged_flipped.merge(&shard);
    assert_eq!(merged_flipped, shard);
}
