//! Field-level checks for the ScoringConfig rule kind.

use super::ValidationResult;

use crate::scoring_config::{
    GateConfig, RiskThresholds, ScoringConfigRule, SignalParams, SignalWeights, API_VERSION, KIND,
};

/// Largest n for which n! is representable as a finite f64.
pub(crate) const MAX_EXACT_FACTORIAL: u64 = 170;

fn is_kebab_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.chars()
            .all(|c| c == '-' || c.is_ascii_lowercase() || c.is_ascii_digit())
}

// ── Metadata ────────────────────────────────────────────────────────

pub(super) fn validate_metadata(rule: &ScoringConfigRule, result: &mut ValidationResult) {
    if rule.api_version != API_VERSION {
        result.error(
            "apiVersion",
            format!("apiVersion must be '{}', got '{}'", API_VERSION, rule.api_version),
        );
    }
    if rule.kind != KIND {
        result.error("kind", format!("kind must be '{}', got '{}'", KIND, rule.kind));
    }
    if !is_kebab_case(&rule.metadata.id) {
        result.error(
            "metadata.id",
            format!(
                "id must be kebab-case (lowercase alphanumeric + hyphens), got '{}'",
                rule.metadata.id
            ),
        );
    }
    if !rule.metadata.enabled {
        result.warn("metadata.enabled", "config is disabled; built-in defaults will apply");
    }
}

// ── Spec sections ───────────────────────────────────────────────────

pub(super) fn validate_weights(weights: &SignalWeights, result: &mut ValidationResult) {
    for (name, weight) in weights.iter() {
        if !weight.is_finite() || weight < 0.0 {
            result.error(
                format!("spec.weights.{name}"),
                format!("weight must be a non-negative number, got {weight}"),
            );
        }
    }
    if weights.iter().all(|(_, w)| w == 0.0) {
        result.warn("spec.weights", "all signal weights are zero; every score will be 0");
    }
}

pub(super) fn validate_gate(gate: &GateConfig, result: &mut ValidationResult) {
    if !(gate.max_score > 0.0 && gate.max_score <= 100.0) {
        result.error(
            "spec.gate.max_score",
            format!("max_score must be in (0, 100], got {}", gate.max_score),
        );
    }
    if !(gate.noise_floor >= 0.0 && gate.noise_floor <= gate.max_score) {
        result.error(
            "spec.gate.noise_floor",
            format!(
                "noise_floor must be in [0, max_score({})], got {}",
                gate.max_score, gate.noise_floor
            ),
        );
    }
}

pub(super) fn validate_signal_params(params: &SignalParams, result: &mut ValidationResult) {
    if !(params.impossible_travel_speed_kmh > 0.0) {
        result.error(
            "spec.signal_params.impossible_travel_speed_kmh",
            format!(
                "speed limit must be positive, got {}",
                params.impossible_travel_speed_kmh
            ),
        );
    }
    if !(params.velocity_burst_threshold >= 0.0) {
        result.error(
            "spec.signal_params.velocity_burst_threshold",
            format!(
                "burst threshold must not be negative, got {}",
                params.velocity_burst_threshold
            ),
        );
    }
    if params.exact_poisson_max_events > MAX_EXACT_FACTORIAL {
        result.error(
            "spec.signal_params.exact_poisson_max_events",
            format!(
                "exact Poisson is limited to {} events (f64 factorial range), got {}",
                MAX_EXACT_FACTORIAL, params.exact_poisson_max_events
            ),
        );
    }
    for &hour in &params.default_unusual_hours {
        if hour > 23 {
            result.error(
                "spec.signal_params.default_unusual_hours",
                format!("hour {hour} outside 0..=23"),
            );
        }
    }
    if params.default_unusual_hours.is_empty() {
        result.warn(
            "spec.signal_params.default_unusual_hours",
            "no default unusual hours; bundles without their own list never count as unusual",
        );
    }
}

pub(super) fn validate_risk_thresholds(t: &RiskThresholds, result: &mut ValidationResult) {
    if !(t.low <= t.medium && t.medium <= t.high && t.high <= t.critical) {
        result.error(
            "spec.risk_thresholds",
            format!(
                "thresholds must be ascending: low({}) <= medium({}) <= high({}) <= critical({})",
                t.low, t.medium, t.high, t.critical
            ),
        );
    }
}

pub(super) fn validate_algorithm_version(version: &str, result: &mut ValidationResult) {
    let parts: Vec<&str> = version.split('.').collect();
    let is_semver = parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    if !is_semver {
        result.warn(
            "spec.algorithm_version",
            format!("'{version}' is not a MAJOR.MINOR.PATCH version"),
        );
    }
}
