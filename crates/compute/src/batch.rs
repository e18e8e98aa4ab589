//! Parallel scoring of independent bundles on a dedicated `rayon` pool.

use std::time::Instant;

use rayon::prelude::*;
use tracing::info;
use vigil_core::{AnomalyScoreResult, PatternData, Result, VigilError};

use crate::engine::BundleScorer;

/// Fans bundles out over a fixed-size thread pool.
///
/// Each bundle is scored independently; one invalid bundle does not stop
/// the others. Results come back in input order.
pub struct BatchScorer<S> {
    scorer: S,
    pool: rayon::ThreadPool,
}

impl<S: BundleScorer> BatchScorer<S> {
    /// Build a pool with `threads` workers (0 lets rayon pick).
    pub fn new(scorer: S, threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("vigil-score-{i}"))
            .build()
            .map_err(|e| VigilError::Other(format!("failed to build scoring pool: {e}")))?;
        Ok(Self { scorer, pool })
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Score every bundle, one outcome per input, in input order.
    pub fn score_all(&self, bundles: &[PatternData]) -> Vec<Result<AnomalyScoreResult>> {
        let start = Instant::now();
        let results: Vec<Result<AnomalyScoreResult>> = self
            .pool
            .install(|| bundles.par_iter().map(|data| self.scorer.score(data)).collect());

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            "Batch of {} bundles scored in {:.3}s on {} workers ({} rejected)",
            bundles.len(),
            start.elapsed().as_secs_f64(),
            self.worker_threads(),
            failed
        );
        results
    }
}
