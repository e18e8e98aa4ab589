use std::collections::BTreeMap;

use vigil_core::{Algorithm, PatternData, ScoreComponent};
use vigil_rules::CompiledScoringConfig;

/// Disruption applied to activity outside the unusual window.
const BASELINE_DISRUPTION: f64 = 0.1;

/// Share of historical activity that fell in `unusual_hours`.
///
/// Counts are scaled by `peak` before summing so large counts cannot
/// overflow the total.
fn unusual_share(pattern: &BTreeMap<u8, f64>, unusual_hours: &[u8], peak: f64) -> f64 {
    if peak <= 0.0 {
        return 0.0;
    }
    let total: f64 = pattern.values().map(|count| count / peak).sum();
    let unusual: f64 = pattern
        .iter()
        .filter(|(h, _)| unusual_hours.contains(*h))
        .map(|(_, count)| count / peak)
        .sum();
    let share = unusual / total;
    if total > 0.0 && share.is_finite() {
        share
    } else {
        0.0
    }
}

/// Signal 3: time-of-day activity.
///
/// Activity in an unusual hour scores 1.5W, anything else 0.5W, both scaled
/// by a circadian disruption factor. Confidence drops as the current hour
/// becomes rarer in the user's history.
pub fn score_temporal(data: &PatternData, config: &CompiledScoringConfig) -> Option<ScoreComponent> {
    let time = data.time_anomaly.as_ref()?;
    let hour = time.current_hour;
    let unusual_hours = time.unusual_hours_or(&config.signal_params.default_unusual_hours);
    let is_unusual = unusual_hours.contains(&hour);

    let pattern = &time.historical_pattern;
    let peak = pattern.values().copied().fold(0.0_f64, f64::max);
    let temporal_deviation = if peak > 0.0 {
        let at_hour = pattern.get(&hour).copied().unwrap_or(0.0);
        (1.0 - at_hour / peak).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let circadian_disruption = if !is_unusual {
        BASELINE_DISRUPTION
    } else {
        (1.0 + unusual_share(pattern, unusual_hours, peak)).ln()
    };

    let multiplier = if is_unusual { 1.5 } else { 0.5 };
    let base = multiplier * config.weights.temporal;
    let score = base * (1.0 + circadian_disruption);

    Some(
        ScoreComponent::new(Algorithm::Temporal, score, 1.0 - temporal_deviation)
            .with_factor("current_hour", hour)
            .with_factor("is_unusual", is_unusual)
            .with_factor("temporal_deviation", temporal_deviation)
            .with_factor("circadian_disruption", circadian_disruption),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::TimeAnomaly;

    fn bundle(hour: u8, unusual: Option<Vec<u8>>, pattern: &[(u8, f64)]) -> PatternData {
        PatternData {
            time_anomaly: Some(TimeAnomaly {
                current_hour: hour,
                unusual_hours: unusual,
                historical_pattern: pattern.iter().copied().collect::<BTreeMap<_, _>>(),
            }),
            ..Default::default()
        }
    }

    fn config() -> CompiledScoringConfig {
        CompiledScoringConfig::default()
    }

    #[test]
    fn unusual_hour_with_history() {
        let c = score_temporal(&bundle(3, None, &[(3, 1.0), (14, 10.0)]), &config()).unwrap();
        let expected = 30.0 * (1.0 + (1.0f64 + 1.0 / 11.0).ln());
        assert!((c.score - expected).abs() < 1e-9);
        assert!((c.confidence - 0.1).abs() < 1e-9);
        assert_eq!(c.factors["is_unusual"], serde_json::json!(true));
    }

    #[test]
    fn ordinary_hour_gets_fixed_disruption() {
        let c = score_temporal(&bundle(14, None, &[(14, 10.0)]), &config()).unwrap();
        assert!((c.score - 11.0).abs() < 1e-9);
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn empty_history_is_guarded() {
        let c = score_temporal(&bundle(4, None, &[]), &config()).unwrap();
        assert_eq!(c.score, 30.0);
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn all_zero_history_is_guarded() {
        let c = score_temporal(&bundle(4, None, &[(4, 0.0), (12, 0.0)]), &config()).unwrap();
        assert_eq!(c.score, 30.0);
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn custom_unusual_hours_override_default() {
        let c = score_temporal(&bundle(3, Some(vec![22, 23]), &[]), &config()).unwrap();
        assert_eq!(c.factors["is_unusual"], serde_json::json!(false));
        let c = score_temporal(&bundle(23, Some(vec![22, 23]), &[]), &config()).unwrap();
        assert_eq!(c.factors["is_unusual"], serde_json::json!(true));
    }

    #[test]
    fn configured_default_hours_apply() {
        let mut cfg = config();
        cfg.signal_params.default_unusual_hours = vec![13];
        let c = score_temporal(&bundle(13, None, &[]), &cfg).unwrap();
        assert_eq!(c.factors["is_unusual"], serde_json::json!(true));
    }

    #[test]
    fn hour_never_seen_has_zero_confidence() {
        let c = score_temporal(&bundle(2, None, &[(9, 5.0)]), &config()).unwrap();
        assert_eq!(c.confidence, 0.0);
        // No activity inside the unusual window: ln(1 + 0) = 0.
        assert_eq!(c.score, 30.0);
    }

    #[test]
    fn missing_hour_scores_as_midnight() {
        let data = PatternData::from_json(
            r#"{"time_anomaly": {"current_hour": null, "historical_pattern": {"0": 5}}}"#,
        )
        .unwrap();
        let c = score_temporal(&data, &config()).unwrap();
        assert_eq!(c.factors["current_hour"], serde_json::json!(0));
        assert!((c.score - 11.0).abs() < 1e-9);
        assert_eq!(c.confidence, 1.0);

        let empty = PatternData::from_json(r#"{"time_anomaly": {}}"#).unwrap();
        let c = score_temporal(&empty, &config()).unwrap();
        assert_eq!(c.factors["current_hour"], serde_json::json!(0));
        assert!((c.score - 11.0).abs() < 1e-9);
    }

    #[test]
    fn no_time_data_is_skipped() {
        assert!(score_temporal(&PatternData::default(), &config()).is_none());
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let c = score_temporal(&bundle(3, None, &[(3, 1e308), (4, 1e308)]), &config()).unwrap();
        // Both hours are unusual: share 1, disruption ln 2.
        assert!(c.score.is_finite());
        assert!((c.score - 30.0 * (1.0 + 2f64.ln())).abs() < 1e-9);
        assert_eq!(c.confidence, 1.0);
    }
}
