use vigil_core::{Algorithm, GeoPoint, PatternData, ScoreComponent};
use vigil_rules::CompiledScoringConfig;

use crate::algorithms::geo::{haversine_km, planar_centroid};
use crate::algorithms::stats::{mean, variance};

/// Normalizer for the variance of distances to the centroid (km²).
const DISPERSION_SCALE: f64 = 10_000.0;

/// Multiplier applied to the spatial weight on impossible travel.
const IMPOSSIBLE_TRAVEL_MULTIPLIER: f64 = 2.5;

/// Result of analyzing one location sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpatialAnalysis {
    pub impossible_travel: bool,
    /// Fastest implied speed between consecutive points, km/h.
    pub max_speed_kmh: f64,
    /// Normalized spread around the centroid, in [0, 1].
    pub dispersion: f64,
    pub score: f64,
    pub confidence: f64,
}

/// Whether an implied speed is physically implausible. Strictly greater: a
/// speed exactly at the limit is still possible.
pub fn exceeds_travel_limit(speed_kmh: f64, limit_kmh: f64) -> bool {
    speed_kmh > limit_kmh
}

fn accuracy_tier(mean_accuracy_m: f64) -> f64 {
    if mean_accuracy_m <= 10.0 {
        0.9
    } else if mean_accuracy_m <= 50.0 {
        0.7
    } else if mean_accuracy_m <= 100.0 {
        0.5
    } else {
        0.3
    }
}

/// Analyze a chronological location sequence.
///
/// Fewer than two points yields score 0 and confidence 0. Consecutive pairs
/// with no positive elapsed time carry no speed and are skipped.
pub fn analyze_spatial(points: &[GeoPoint], config: &CompiledScoringConfig) -> SpatialAnalysis {
    if points.len() < 2 {
        return SpatialAnalysis::default();
    }

    let limit = config.signal_params.impossible_travel_speed_kmh;
    let mut max_speed_kmh = 0.0_f64;
    let mut impossible_travel = false;
    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let elapsed_ms = (b.timestamp - a.timestamp).num_milliseconds();
        if elapsed_ms <= 0 {
            continue;
        }
        let hours = elapsed_ms as f64 / 3_600_000.0;
        let speed = haversine_km(a.latitude, a.longitude, b.latitude, b.longitude) / hours;
        max_speed_kmh = max_speed_kmh.max(speed);
        if exceeds_travel_limit(speed, limit) {
            impossible_travel = true;
        }
    }

    let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.latitude, p.longitude)).collect();
    let dispersion = match planar_centroid(&coords) {
        Some((c_lat, c_lon)) => {
            let distances: Vec<f64> = coords
                .iter()
                .map(|&(lat, lon)| haversine_km(lat, lon, c_lat, c_lon))
                .collect();
            (variance(&distances) / DISPERSION_SCALE).min(1.0)
        }
        None => 0.0,
    };

    let weight = config.weights.spatial;
    let score = if impossible_travel {
        weight * IMPOSSIBLE_TRAVEL_MULTIPLIER
    } else {
        weight * dispersion
    };

    let count_bonus = ((points.len() as f64).ln() / 100f64.ln()).min(1.0);
    let accuracies: Vec<f64> = points.iter().map(|p| p.accuracy).collect();
    let confidence = (count_bonus + accuracy_tier(mean(&accuracies))) / 2.0;

    SpatialAnalysis {
        impossible_travel,
        max_speed_kmh,
        dispersion,
        score,
        confidence,
    }
}

/// Signal 4: geographic movement.
pub fn score_spatial(data: &PatternData, config: &CompiledScoringConfig) -> Option<ScoreComponent> {
    let points = &data.location_anomaly.as_ref()?.location_sequence;
    if points.len() < 2 {
        return None;
    }
    let analysis = analyze_spatial(points, config);

    Some(
        ScoreComponent::new(Algorithm::Spatial, analysis.score, analysis.confidence)
            .with_factor("impossible_travel", analysis.impossible_travel)
            .with_factor("max_speed_kmh", analysis.max_speed_kmh)
            .with_factor("dispersion", analysis.dispersion)
            .with_factor("point_count", points.len()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use vigil_core::LocationAnomaly;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn point(lat: f64, lon: f64, minutes: i64, accuracy: f64) -> GeoPoint {
        GeoPoint {
            latitude: lat,
            longitude: lon,
            timestamp: t0() + Duration::minutes(minutes),
            accuracy,
        }
    }

    fn bundle(points: Vec<GeoPoint>) -> PatternData {
        PatternData {
            location_anomaly: Some(LocationAnomaly {
                location_sequence: points,
            }),
            ..Default::default()
        }
    }

    fn config() -> CompiledScoringConfig {
        CompiledScoringConfig::default()
    }

    #[test]
    fn two_thousand_km_in_an_hour_is_impossible() {
        // 18° of longitude on the equator ≈ 2001 km.
        let points = vec![point(0.0, 0.0, 0, 5.0), point(0.0, 18.0, 60, 5.0)];
        let c = score_spatial(&bundle(points), &config()).unwrap();
        assert_eq!(c.score, 62.5);
        assert_eq!(c.factors["impossible_travel"], serde_json::json!(true));
    }

    #[test]
    fn limit_is_exclusive() {
        assert!(!exceeds_travel_limit(1000.0, 1000.0));
        assert!(exceeds_travel_limit(1000.0001, 1000.0));
        assert!(!exceeds_travel_limit(999.9, 1000.0));
    }

    #[test]
    fn plausible_trip_scores_dispersion() {
        // Berlin → Paris over a day.
        let points = vec![point(52.52, 13.405, 0, 20.0), point(48.8566, 2.3522, 24 * 60, 20.0)];
        let a = analyze_spatial(&points, &config());
        assert!(!a.impossible_travel);
        assert!(a.max_speed_kmh > 30.0 && a.max_speed_kmh < 40.0);
        // Both points sit roughly 440 km from the centroid, so the spread is small.
        assert!(a.dispersion > 0.0 && a.dispersion < 0.05);
        assert!((a.score - 25.0 * a.dispersion).abs() < 1e-12);
    }

    #[test]
    fn uneven_spread_saturates_dispersion() {
        let points = vec![
            point(52.52, 13.405, 0, 5.0),
            point(52.53, 13.41, 600, 5.0),
            point(52.51, 13.40, 1200, 5.0),
            point(40.4168, -3.7038, 6000, 5.0),
        ];
        let a = analyze_spatial(&points, &config());
        assert!(!a.impossible_travel);
        assert_eq!(a.dispersion, 1.0);
        assert_eq!(a.score, 25.0);
    }

    #[test]
    fn confidence_blends_count_and_accuracy() {
        let points = vec![point(10.0, 10.0, 0, 5.0), point(10.0, 10.0, 60, 15.0)];
        let a = analyze_spatial(&points, &config());
        // mean accuracy 10 m → 0.9; count bonus ln 2 / ln 100
        let expected = (2f64.ln() / 100f64.ln() + 0.9) / 2.0;
        assert!((a.confidence - expected).abs() < 1e-12);
    }

    #[test]
    fn accuracy_tiers() {
        assert_eq!(accuracy_tier(0.0), 0.9);
        assert_eq!(accuracy_tier(50.0), 0.7);
        assert_eq!(accuracy_tier(100.0), 0.5);
        assert_eq!(accuracy_tier(100.5), 0.3);
    }

    #[test]
    fn fewer_than_two_points() {
        let cfg = config();
        assert_eq!(analyze_spatial(&[], &cfg), SpatialAnalysis::default());
        let single = [point(1.0, 1.0, 0, 5.0)];
        let a = analyze_spatial(&single, &cfg);
        assert_eq!((a.score, a.confidence), (0.0, 0.0));
        assert!(score_spatial(&bundle(single.to_vec()), &cfg).is_none());
        assert!(score_spatial(&bundle(Vec::new()), &cfg).is_none());
    }

    #[test]
    fn simultaneous_points_are_not_infinitely_fast() {
        let points = vec![point(0.0, 0.0, 0, 5.0), point(0.0, 90.0, 0, 5.0)];
        let a = analyze_spatial(&points, &config());
        assert!(!a.impossible_travel);
        assert_eq!(a.max_speed_kmh, 0.0);
        assert!(a.score.is_finite());
    }

    #[test]
    fn configured_speed_limit_applies() {
        let mut cfg = config();
        cfg.signal_params.impossible_travel_speed_kmh = 20.0;
        let points = vec![point(52.52, 13.405, 0, 20.0), point(48.8566, 2.3522, 24 * 60, 20.0)];
        assert!(analyze_spatial(&points, &cfg).impossible_travel);
    }
}
