use vigil_core::{Algorithm, PatternData, ScoreComponent};
use vigil_rules::CompiledScoringConfig;

use crate::algorithms::stats::poisson_probability;

/// Score multiplier for an observed/expected ratio.
pub fn frequency_multiplier(ratio: f64) -> f64 {
    if ratio > 5.0 {
        2.0
    } else if ratio > 3.0 {
        1.5
    } else if ratio > 2.0 {
        1.0
    } else {
        0.0
    }
}

/// Signal 2: event frequency against expectation.
///
/// Score steps with observed/expected. Confidence is the Poisson likelihood
/// of the observed count, so a wildly off count scores high with low confidence.
pub fn score_frequency(data: &PatternData, config: &CompiledScoringConfig) -> Option<ScoreComponent> {
    let freq = data.frequency_anomaly.as_ref()?;
    if !(freq.expected > 0.0) {
        return None;
    }

    let ratio = freq.observed as f64 / freq.expected;
    let score = config.weights.frequency * frequency_multiplier(ratio);
    let probability = poisson_probability(
        freq.observed,
        freq.expected,
        config.signal_params.exact_poisson_max_events,
    );

    Some(
        ScoreComponent::new(Algorithm::Frequency, score, probability.clamp(0.0, 1.0))
            .with_factor("ratio", ratio)
            .with_factor("observed", freq.observed)
            .with_factor("expected", freq.expected)
            .with_factor("poisson_probability", probability),
    )
}
