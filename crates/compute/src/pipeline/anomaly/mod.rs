//! Anomaly scoring pipeline orchestration.
//!
//! Runs every signal scorer against one bundle, combines the resulting
//! components and gates the result.
//!
//! Sub-modules:
//! - [`signals`]: individual signal scorer functions
//! - [`ensemble`]: confidence-weighted combination and overall confidence
//! - [`gate`]: bounds and noise-floor post-processing

pub mod ensemble;
pub mod gate;
pub mod signals;

use tracing::debug;
use vigil_core::{AnomalyScoreResult, Algorithm, PatternData, RiskLevel, ScoreComponent};
use vigil_rules::CompiledScoringConfig;

// ── Re-exports ────────────────────────────────────────────────────────
pub use ensemble::{combine, overall_confidence};
pub use gate::apply_gate;
pub use signals::{
    score_deviation, score_device, score_frequency, score_spatial, score_temporal, score_velocity,
};

/// Signature shared by every signal scorer.
pub type SignalFn = fn(&PatternData, &CompiledScoringConfig) -> Option<ScoreComponent>;

/// Signal scorers in evaluation order. Components are reported in this order.
pub const SIGNALS: [(Algorithm, SignalFn); 6] = [
    (Algorithm::Deviation, score_deviation),
    (Algorithm::Frequency, score_frequency),
    (Algorithm::Temporal, score_temporal),
    (Algorithm::Spatial, score_spatial),
    (Algorithm::Velocity, score_velocity),
    (Algorithm::Device, score_device),
];

/// Run every scorer and keep every component it returns.
///
/// A signal without its required data yields no component. A signal that
/// ran but scored 0 is still a component and takes part in the ensemble.
pub fn collect_components(data: &PatternData, config: &CompiledScoringConfig) -> Vec<ScoreComponent> {
    SIGNALS
        .iter()
        .filter_map(|(algorithm, scorer)| {
            let component = scorer(data, config)?;
            debug!(
                signal = %algorithm,
                score = component.score,
                confidence = component.confidence,
                "signal scored"
            );
            Some(component)
        })
        .collect()
}

/// Classify a gated score against the configured risk boundaries.
pub fn classify_risk(score: f64, config: &CompiledScoringConfig) -> RiskLevel {
    let t = &config.risk_thresholds;
    RiskLevel::from_score_with(score, t.low, t.medium, t.high, t.critical)
}

/// Score one bundle. Pure: identical inputs give identical results.
pub fn score_pattern(data: &PatternData, config: &CompiledScoringConfig) -> AnomalyScoreResult {
    let components = collect_components(data, config);
    if components.is_empty() {
        return AnomalyScoreResult::empty(config.algorithm_version.clone());
    }

    let raw = combine(&components);
    let total_score = apply_gate(raw, &config.gate);
    let confidence = overall_confidence(&components);

    debug!(
        components = components.len(),
        raw_score = raw,
        total_score,
        confidence,
        "ensemble combined"
    );

    AnomalyScoreResult {
        total_score,
        risk_level: classify_risk(total_score, config),
        components,
        confidence,
        algorithm_version: config.algorithm_version.clone(),
    }
}
