//! Post-processing gate: bounds and noise suppression.

use vigil_rules::scoring_config::GateConfig;

/// Clamp `score` to `[0, max_score]`, then zero it below the noise floor.
///
/// The clamp always applies; `enabled: false` only turns off the floor.
/// A NaN input is treated as 0.
pub fn apply_gate(score: f64, gate: &GateConfig) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    let bounded = score.max(0.0).min(gate.max_score.max(0.0));
    if gate.enabled && bounded < gate.noise_floor {
        0.0
    } else {
        bounded
    }
}
