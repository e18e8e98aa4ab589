//! Confidence-weighted combination of signal components.

use vigil_core::ScoreComponent;

use crate::algorithms::stats::{mean, variance};

/// Upper bound of the combined score before gating.
pub const ENSEMBLE_CAP: f64 = 100.0;

const DIVERSITY_RATE: f64 = 0.05;
const DIVERSITY_CAP: f64 = 0.20;
const CONSENSUS_RATE: f64 = 0.10;
const CONFIDENCE_BOOST_RATE: f64 = 0.1;

/// Bonus for several independent signals agreeing that something is off.
pub fn diversity_bonus(count: usize) -> f64 {
    if count < 2 {
        return 0.0;
    }
    ((count as f64).ln() * DIVERSITY_RATE).min(DIVERSITY_CAP)
}

/// Bonus for components that are similarly confident. Needs at least two.
pub fn consensus_bonus(confidences: &[f64]) -> f64 {
    if confidences.len() < 2 {
        return 0.0;
    }
    (1.0 - variance(confidences).min(1.0)) * CONSENSUS_RATE
}

/// Combine components into one raw score in [0, 100].
///
/// Scores are weighted by each component's share of the total confidence.
/// When every confidence is zero the plain sum is used instead.
pub fn combine(components: &[ScoreComponent]) -> f64 {
    if components.is_empty() {
        return 0.0;
    }

    let confidence_sum: f64 = components.iter().map(|c| c.confidence).sum();
    if confidence_sum <= 0.0 {
        let sum: f64 = components.iter().map(|c| c.score).sum();
        return sum.min(ENSEMBLE_CAP);
    }

    let weighted: f64 = components
        .iter()
        .map(|c| c.score * (c.confidence / confidence_sum))
        .sum();

    let confidences: Vec<f64> = components.iter().map(|c| c.confidence).collect();
    let bonus = diversity_bonus(components.len()) + consensus_bonus(&confidences);

    (weighted * (1.0 + bonus)).min(ENSEMBLE_CAP)
}

/// Overall confidence: mean component confidence plus ln(n+1)·0.1, capped at 1.
pub fn overall_confidence(components: &[ScoreComponent]) -> f64 {
    if components.is_empty() {
        return 0.0;
    }
    let confidences: Vec<f64> = components.iter().map(|c| c.confidence).collect();
    let boost = ((components.len() + 1) as f64).ln() * CONFIDENCE_BOOST_RATE;
    (mean(&confidences) + boost).min(1.0)
}
