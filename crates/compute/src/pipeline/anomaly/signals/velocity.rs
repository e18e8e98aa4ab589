use vigil_core::{Algorithm, PatternData, ScoreComponent};
use vigil_rules::CompiledScoringConfig;

/// Burst intensity for a current/baseline velocity ratio.
///
/// Piecewise: logarithmic above 10x, natural-log between 5x and 10x, linear
/// between 2x and 5x, zero at or below 2x.
pub fn burst_intensity(ratio: f64) -> f64 {
    if ratio > 10.0 {
        3.0 + ratio.log10()
    } else if ratio > 5.0 {
        2.0 + ratio.ln()
    } else if ratio > 2.0 {
        1.0 + (ratio - 2.0) / 3.0
    } else {
        0.0
    }
}

/// Signal 5: request velocity burst.
pub fn score_velocity(data: &PatternData, config: &CompiledScoringConfig) -> Option<ScoreComponent> {
    let velocity = data.velocity_anomaly.as_ref()?;
    if velocity.baseline_velocity == 0.0 {
        return None;
    }

    let ratio = velocity.current_velocity / velocity.baseline_velocity;
    if !ratio.is_finite() {
        return None;
    }
    let burst = burst_intensity(ratio);
    let threshold = config.signal_params.velocity_burst_threshold;
    let score = if burst > threshold {
        config.weights.velocity * burst
    } else {
        0.0
    };
    let confidence = 1.0 - 1.0 / (1.0 + (-burst).exp());

    Some(
        ScoreComponent::new(Algorithm::Velocity, score, confidence)
            .with_factor("ratio", ratio)
            .with_factor("burst_intensity", burst)
            .with_factor("burst_threshold", threshold),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::VelocityAnomaly;

    fn bundle(current: f64, baseline: f64) -> PatternData {
        PatternData {
            velocity_anomaly: Some(VelocityAnomaly {
                current_velocity: current,
                baseline_velocity: baseline,
            }),
            ..Default::default()
        }
    }

    fn config() -> CompiledScoringConfig {
        CompiledScoringConfig::default()
    }

    #[test]
    fn burst_pieces() {
        assert_eq!(burst_intensity(1.0), 0.0);
        assert_eq!(burst_intensity(2.0), 0.0);
        assert!((burst_intensity(3.5) - 1.5).abs() < 1e-12);
        assert!((burst_intensity(8.0) - (2.0 + 8f64.ln())).abs() < 1e-12);
        assert!((burst_intensity(100.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn burst_below_threshold_scores_zero() {
        let c = score_velocity(&bundle(500.0, 10.0), &config()).unwrap();
        assert_eq!(c.score, 0.0);
        assert!((c.factors["burst_intensity"].as_f64().unwrap() - (3.0 + 50f64.log10())).abs() < 1e-12);
    }

    #[test]
    fn burst_above_threshold_scores_weight_times_burst() {
        // ratio 1e8 → burst 11
        let c = score_velocity(&bundle(1e8, 1.0), &config()).unwrap();
        assert!((c.score - 35.0 * 11.0).abs() < 1e-9);
    }

    #[test]
    fn lower_threshold_lets_moderate_bursts_fire() {
        let mut cfg = config();
        cfg.signal_params.velocity_burst_threshold = 2.0;
        let c = score_velocity(&bundle(30.0, 3.0), &cfg).unwrap();
        // ratio exactly 10 sits in the ln band: 2 + ln 10
        let burst = 2.0 + 10f64.ln();
        assert!((c.score - 35.0 * burst).abs() < 1e-9);
    }

    #[test]
    fn confidence_is_logistic_complement() {
        let c = score_velocity(&bundle(1.0, 1.0), &config()).unwrap();
        assert_eq!(c.confidence, 0.5);
        let c = score_velocity(&bundle(100.0, 1.0), &config()).unwrap();
        let expected = 1.0 - 1.0 / (1.0 + (-5.0f64).exp());
        assert!((c.confidence - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_baseline_is_skipped() {
        assert!(score_velocity(&bundle(50.0, 0.0), &config()).is_none());
        assert!(score_velocity(&bundle(1e300, 1e-300), &config()).is_none());
        assert!(score_velocity(&PatternData::default(), &config()).is_none());
    }
}
