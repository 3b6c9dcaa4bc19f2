//! End-to-end pipeline: parallel collect, artifact exchange, reduce,
//! derivation, report files.

use anyhow::Result;
use langstats::collector::StatsCollector;
use langstats::reducer::{ReportFormat, StatsReducer};
use langstats::report::default_derivation;
use langstats::runner::run_map_phase;
use langstats::testing::doc;
use langstats::tokenizer::TokenizerRegistry;
use std::sync::Arc;

#[tokio::test]
async fn full_pipeline_produces_one_report_per_language() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let artifacts = dir.path().join("artifacts");
    let reports = dir.path().join("reports");

    let shards = vec![
        vec![
            doc("the cat sat on the mat", "en"),
            doc("# header\nthe rest of the document...", "en"),
            doc("le chat est noir", "fr"),
        ],
        vec![
            doc("the dog ran far away", "en"),
            doc("le chien est grand", "fr"),
            doc("sin idioma conocido", "es"),
        ],
        vec![doc("the end", "en")],
    ];

    let collector = Arc::new(
        StatsCollector::new(&artifacts, Arc::new(TokenizerRegistry::default()))
            .with_word_count_prune(None),
    );
    let map_result = run_map_phase(collector, shards, 2).await?;
    assert_eq!(map_result.artifacts.len(), 3);
    assert_eq!(map_result.total_documents, 7);

    let merged = StatsReducer::new(&artifacts, &reports)
        .with_derivation(Arc::new(default_derivation))
        .run(1)?;

    assert_eq!(merged.len(), 3);
    assert_eq!(merged["en"].total_docs, 4);
    assert_eq!(merged["fr"].total_docs, 2);
    assert_eq!(merged["es"].total_docs, 1);
    // "the" appears in every English document; the merged histogram sees
    // all of them even though no single shard saw more than three.
    assert_eq!(merged["en"].word_histogram["the"], 6);

    for language in ["en", "fr", "es"] {
        let path = reports.join(format!("{language}.json"));
        assert!(path.exists(), "missing report for {language}");
        let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        assert_eq!(report["total_docs"], merged[language].total_docs);
        assert!(report["stopwords_top_n"]["6"].is_array());
    }
    Ok(())
}

#[tokio::test]
async fn sequential_and_parallel_collection_agree() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let docs = vec![
        doc("alpha beta gamma", "en"),
        doc("alpha alpha delta", "en"),
        doc("beta… beta...", "en"),
        doc("", "en"),
    ];

    // One worker over the whole corpus.
    let single_artifacts = dir.path().join("single");
    let collector = Arc::new(
        StatsCollector::new(&single_artifacts, Arc::new(TokenizerRegistry::default()))
            .with_word_count_prune(None),
    );
    run_map_phase(collector, vec![docs.clone()], 1).await?;
    let single = StatsReducer::new(&single_artifacts, dir.path().join("single_reports")).run(1)?;

    // The same corpus split across three workers.
    let split_artifacts = dir.path().join("split");
    let collector = Arc::new(
        StatsCollector::new(&split_artifacts, Arc::new(TokenizerRegistry::default()))
            .with_word_count_prune(None),
    );
    let shards = vec![
        docs[0..1].to_vec(),
        docs[1..3].to_vec(),
        docs[3..].to_vec(),
    ];
    run_map_phase(collector, shards, 3).await?;
    let split = StatsReducer::new(&split_artifacts, dir.path().join("split_reports")).run(1)?;

    let a = &single["en"];
    let b = &split["en"];
    assert_eq!(a.total_docs, b.total_docs);
    assert_eq!(a.total_words, b.total_words);
    assert_eq!(a.word_histogram, b.word_histogram);
    assert_eq!(a.length_histogram, b.length_histogram);
    for (name, summary) in &a.ratio_metrics {
        let lhs = summary.expect("defined metric");
        let rhs = b.ratio_metrics[name].expect("defined metric");
        assert!((lhs.mean - rhs.mean).abs() < 1e-9, "{name} mean");
        assert!((lhs.std - rhs.std).abs() < 1e-9, "{name} std");
    }
    Ok(())
}

#[test]
fn reducer_rejects_concurrent_invocation_before_touching_disk() {
    // The input folder does not even exist; the precondition check fires
    // first.
    let err = StatsReducer::new("/nonexistent/in", "/nonexistent/out")
        .with_format(ReportFormat::Yaml)
        .run(4)
        .unwrap_err();
    assert!(matches!(err, langstats::Error::ConcurrentReduce(4)));
}
