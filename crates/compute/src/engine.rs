use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use vigil_core::{AnomalyScoreResult, PatternData, Result};
use vigil_rules::{CompiledScoringConfig, ConfigHandle};

use crate::pipeline::anomaly::score_pattern;

/// Anything that turns a bundle into a scored result.
///
/// Implemented by [`AnomalyScorer`] and by wrappers such as
/// [`crate::cache::CachedScorer`], so batch and cache layers compose.
pub trait BundleScorer: Send + Sync {
    /// Validate and score one bundle.
    fn score(&self, data: &PatternData) -> Result<AnomalyScoreResult>;

    /// Version stamped on results produced right now.
    fn algorithm_version(&self) -> String;
}

#[derive(Debug, Clone)]
enum ConfigSource {
    Fixed(Arc<CompiledScoringConfig>),
    Live(ConfigHandle),
}

/// The behavioral anomaly scorer.
///
/// Holds no mutable state: every call reads a config snapshot and runs the
/// pure pipeline. A live scorer picks up hot reloads between calls; a call
/// already in flight keeps the snapshot it started with.
#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    source: ConfigSource,
}

impl AnomalyScorer {
    pub fn new(config: CompiledScoringConfig) -> Self {
        Self::from_shared(Arc::new(config))
    }

    pub fn from_shared(config: Arc<CompiledScoringConfig>) -> Self {
        Self {
            source: ConfigSource::Fixed(config),
        }
    }

    /// Follow a config store, seeing every successful reload.
    pub fn live(handle: ConfigHandle) -> Self {
        Self {
            source: ConfigSource::Live(handle),
        }
    }

    /// Snapshot of the config the next call will use.
    pub fn config(&self) -> Arc<CompiledScoringConfig> {
        match &self.source {
            ConfigSource::Fixed(config) => Arc::clone(config),
            ConfigSource::Live(handle) => handle.current(),
        }
    }

    /// Decode a JSON bundle, validate it and score it.
    pub fn score_json(&self, json: &str) -> Result<AnomalyScoreResult> {
        let data = PatternData::from_json(json)?;
        self.score_unchecked(&data)
    }

    fn score_unchecked(&self, data: &PatternData) -> Result<AnomalyScoreResult> {
        let start = Instant::now();
        let config = self.config();
        let result = score_pattern(data, &config);
        debug!(
            total_score = result.total_score,
            risk_level = %result.risk_level,
            components = result.components.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "bundle scored"
        );
        Ok(result)
    }
}

impl Default for AnomalyScorer {
    fn default() -> Self {
        Self::new(CompiledScoringConfig::default())
    }
}

impl BundleScorer for AnomalyScorer {
    fn score(&self, data: &PatternData) -> Result<AnomalyScoreResult> {
        data.validate()?;
        self.score_unchecked(data)
    }

    fn algorithm_version(&self) -> String {
        self.config().algorithm_version.clone()
    }
}

/// Score a slice of bundles sequentially, logging a summary.
///
/// Fails on the first invalid bundle. Use [`crate::batch::BatchScorer`] to
/// fan out over a thread pool and collect per-item outcomes.
pub fn score_all<S: BundleScorer + ?Sized>(
    scorer: &S,
    bundles: &[PatternData],
) -> Result<Vec<AnomalyScoreResult>> {
    let start = Instant::now();
    let results = bundles
        .iter()
        .map(|data| scorer.score(data))
        .collect::<Result<Vec<_>>>()?;
    let flagged = results.iter().filter(|r| r.total_score > 0.0).count();
    info!(
        "Scored {} bundles in {:.3}s ({} above noise floor)",
        results.len(),
        start.elapsed().as_secs_f64(),
        flagged
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::VigilError;
    use vigil_rules::ScoringConfigStore;

    #[test]
    fn scores_json_bundle() {
        let scorer = AnomalyScorer::default();
        let result = scorer.score_json(r#"{"deviation": 3.0, "std_dev": 1.0}"#).unwrap();
        assert_eq!(result.total_score, 45.0);
        assert_eq!(result.components.len(), 1);
    }

    #[test]
    fn rejects_malformed_bundle() {
        let scorer = AnomalyScorer::default();
        let err = scorer
            .score_json(r#"{"location_anomaly": {"location_sequence": [{"latitude": 1, "longitude": 2, "timestamp": "yesterday"}]}}"#)
            .unwrap_err();
        assert!(matches!(err, VigilError::Deserialize(_)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let scorer = AnomalyScorer::default();
        let data = PatternData {
            deviation: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(matches!(scorer.score(&data), Err(VigilError::Validation { .. })));
    }

    #[test]
    fn version_comes_from_active_config() {
        let store = ScoringConfigStore::default();
        let scorer = AnomalyScorer::live(store.handle());
        assert_eq!(scorer.algorithm_version(), "2.1.0");
        let fixed = AnomalyScorer::new(CompiledScoringConfig {
            algorithm_version: "9.0.0".into(),
            ..Default::default()
        });
        assert_eq!(fixed.algorithm_version(), "9.0.0");
    }

    #[test]
    fn sequential_batch_keeps_order() {
        let scorer = AnomalyScorer::default();
        let bundles = vec![
            PatternData {
                deviation: Some(3.0),
                ..Default::default()
            },
            PatternData::default(),
        ];
        let results = score_all(&scorer, &bundles).unwrap();
        assert_eq!(results[0].total_score, 45.0);
        assert_eq!(results[1].total_score, 0.0);
    }
}
