use vigil_core::{Algorithm, PatternData, ScoreComponent};
use vigil_rules::CompiledScoringConfig;

use crate::algorithms::stats::normal_cdf;

/// Used when the bundle carries a deviation without a standard deviation.
pub const DEFAULT_STD_DEV: f64 = 1.0;

/// Score multiplier for a cumulative probability.
pub fn deviation_multiplier(probability: f64) -> f64 {
    if probability > 0.95 {
        1.5
    } else if probability > 0.90 {
        1.2
    } else if probability > 0.75 {
        0.8
    } else {
        0.5
    }
}

/// Signal 1: statistical deviation.
///
/// z = deviation / std_dev, p = Φ(|z|). Score steps with p against the
/// deviation weight; confidence is p itself.
pub fn score_deviation(data: &PatternData, config: &CompiledScoringConfig) -> Option<ScoreComponent> {
    let deviation = data.deviation.unwrap_or(0.0);
    if deviation == 0.0 {
        return None;
    }
    let std_dev = data.std_dev.unwrap_or(DEFAULT_STD_DEV);
    if std_dev == 0.0 {
        return None;
    }

    let z = deviation / std_dev;
    let probability = normal_cdf(z.abs());
    let score = config.weights.deviation * deviation_multiplier(probability);

    Some(
        ScoreComponent::new(Algorithm::Deviation, score, probability)
            .with_factor("z_score", z)
            .with_factor("probability", probability)
            .with_factor("std_dev", std_dev),
    )
}
