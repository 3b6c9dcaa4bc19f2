//! In-process map-phase scheduling
//!
//! Collector instances share no mutable state, so any scheduling model is
//! valid. This runner is the in-process one: each shard becomes a blocking
//! task (rank = shard index), bounded by a semaphore. Distributed
//! executors can drive [`crate::collector::StatsCollector`] directly and
//! skip this module entirely.

use crate::collector::StatsCollector;
use crate::document::Document;
use crate::error::{Error, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::info;

/// Outcome of running the map phase over every shard.
#[derive(Debug)]
pub struct MapPhaseResult {
    /// Artifact path per worker, in rank order.
    pub artifacts: Vec<PathBuf>,
    /// Documents forwarded across all workers.
    pub total_documents: usize,
}

/// Run one collector worker per shard, at most `max_parallel` at a time.
///
/// Every worker drains its shard through the pass-through iterator (so
/// the forwarding contract holds even with no downstream stage attached)
/// and then persists its artifact. Any worker failure fails the phase.
pub async fn run_map_phase(
    collector: Arc<StatsCollector>,
    shards: Vec<Vec<Document>>,
    max_parallel: usize,
) -> Result<MapPhaseResult> {
    if max_parallel == 0 {
        return Err(Error::Config("max_parallel must be at least 1".to_string()));
    }

    let total_shards = shards.len();
    info!(
        "Executing map phase with {} shards (max parallel: {})",
        total_shards, max_parallel
    );

    let semaphore = Arc::new(Semaphore::new(max_parallel));
    let mut futures = FuturesUnordered::new();

    for (rank, shard) in shards.into_iter().enumerate() {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| Error::Worker(e.to_string()))?;
        let collector = collector.clone();

        futures.push(tokio::task::spawn_blocking(move || {
            let mut run = collector.run(shard, rank);
            let mut forwarded = 0usize;
            for _doc in run.by_ref() {
                forwarded += 1;
            }
            let path = run.finish()?;
            drop(permit);
            Ok::<(usize, PathBuf, usize), Error>((rank, path, forwarded))
        }));
    }

    let mut outcomes: Vec<Option<PathBuf>> = vec![None; total_shards];
    let mut total_documents = 0usize;
    while let Some(joined) = futures.next().await {
        let (rank, path, forwarded) = joined.map_err(|e| Error::Worker(e.to_string()))??;
        outcomes[rank] = Some(path);
        total_documents += forwarded;
    }

    let artifacts = outcomes
        .into_iter()
        .enumerate()
        .map(|(rank, path)| path.ok_or_else(|| Error::Worker(format!("rank {rank} produced no artifact"))))
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Map phase complete: {} documents across {} workers",
        total_documents, total_shards
    );
    Ok(MapPhaseResult {
        artifacts,
        total_documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::PartitionArtifact;
    use crate::testing::doc;
    use crate::tokenizer::TokenizerRegistry;

    #[tokio::test]
    async fn test_one_artifact_per_shard() {
        let dir = tempfile::tempdir().unwrap();
        let collector = Arc::new(StatsCollector::new(
            dir.path(),
            Arc::new(TokenizerRegistry::default()),
        ));
        let shards = vec![
            vec![doc("a a b", "en")],
            vec![doc("c d", "en"), doc("bonjour", "fr")],
            vec![],
        ];

        let result = run_map_phase(collector, shards, 2).await.unwrap();
        assert_eq!(result.artifacts.len(), 3);
        assert_eq!(result.total_documents, 3);
        for (rank, path) in result.artifacts.iter().enumerate() {
            assert!(path.ends_with(PartitionArtifact::file_name(rank)));
            assert!(path.exists());
        }
    }

    #[tokio::test]
    async fn test_zero_parallelism_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let collector = Arc::new(StatsCollector::new(
            dir.path(),
            Arc::new(TokenizerRegistry::default()),
        ));
        let err = run_map_phase(collector, vec![vec![]], 0).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
