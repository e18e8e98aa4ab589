//! ScoringConfig rule kind: signal weights, post-processing gate,
//! per-signal thresholds, and risk bands for the behavioral engine.

use serde::{Deserialize, Serialize};

use crate::loader::{Result, RuleError};

pub const KIND: &str = "ScoringConfig";
pub const API_VERSION: &str = "v1";

// ── YAML-level types ────────────────────────────────────────────────

/// Top-level ScoringConfig rule document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfigRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ConfigMetadata,
    pub spec: ScoringConfigSpec,
}

/// Identification block shared by rule documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Specification section of a ScoringConfig rule.
///
/// Every section is optional in YAML; omitted values fall back to the
/// built-in defaults, so a document only needs to list what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfigSpec {
    /// Semantic version stamped on every result.
    #[serde(default = "default_algorithm_version")]
    pub algorithm_version: String,
    #[serde(default)]
    pub weights: SignalWeights,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub signal_params: SignalParams,
    #[serde(default)]
    pub risk_thresholds: RiskThresholds,
}

fn default_algorithm_version() -> String {
    "2.1.0".to_string()
}

impl Default for ScoringConfigSpec {
    fn default() -> Self {
        Self {
            algorithm_version: default_algorithm_version(),
            weights: SignalWeights::default(),
            gate: GateConfig::default(),
            signal_params: SignalParams::default(),
            risk_thresholds: RiskThresholds::default(),
        }
    }
}

/// Base weight of each signal scorer. Scores are multiples of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SignalWeights {
    pub deviation: f64,
    pub frequency: f64,
    pub temporal: f64,
    pub spatial: f64,
    pub velocity: f64,
    pub device: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            deviation: 30.0,
            frequency: 25.0,
            temporal: 20.0,
            spatial: 25.0,
            velocity: 35.0,
            device: 15.0,
        }
    }
}

impl SignalWeights {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("deviation", self.deviation),
            ("frequency", self.frequency),
            ("temporal", self.temporal),
            ("spatial", self.spatial),
            ("velocity", self.velocity),
            ("device", self.device),
        ]
        .into_iter()
    }
}

/// Post-processing gate applied to the ensemble score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// When false, the ensemble score is only clamped to [0, max_score].
    pub enabled: bool,
    /// Scores strictly below this are reported as 0.
    pub noise_floor: f64,
    pub max_score: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            noise_floor: 10.0,
            max_score: 100.0,
        }
    }
}

/// Thresholds internal to individual signal scorers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SignalParams {
    /// Travel faster than this between consecutive points is impossible.
    pub impossible_travel_speed_kmh: f64,
    /// Burst intensity must exceed this for the velocity signal to score.
    pub velocity_burst_threshold: f64,
    /// Largest event count evaluated with the exact Poisson pmf.
    pub exact_poisson_max_events: u64,
    /// Used when a bundle's time signal does not list unusual hours.
    pub default_unusual_hours: Vec<u8>,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            impossible_travel_speed_kmh: 1000.0,
            velocity_burst_threshold: 10.0,
            exact_poisson_max_events: 30,
            default_unusual_hours: vec![2, 3, 4, 5],
        }
    }
}

/// Ascending lower bounds for the risk bands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RiskThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: 10.0,
            medium: 30.0,
            high: 60.0,
            critical: 85.0,
        }
    }
}

// ── Compiled (hot-path) types ───────────────────────────────────────

/// Pre-compiled scoring config. Every field is already typed.
pub type CompiledScoringConfig = ScoringConfigSpec;

impl ScoringConfigRule {
    /// Parse a YAML document, rejecting documents of another kind.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let rule: ScoringConfigRule = serde_yaml::from_str(yaml)?;
        if rule.kind != KIND {
            return Err(RuleError::Validation(format!(
                "expected kind '{}', found '{}'",
                KIND, rule.kind
            )));
        }
        Ok(rule)
    }

    /// Compile the YAML config into its runtime form.
    pub fn compile(&self) -> CompiledScoringConfig {
        self.spec.clone()
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_YAML: &str = include_str!("../../../data/rules/scoring/scoring-config.yml");

    #[test]
    fn parse_default_config_yaml() {
        let rule = ScoringConfigRule::from_yaml(DEFAULT_YAML).unwrap();
        assert_eq!(rule.kind, "ScoringConfig");
        assert_eq!(rule.metadata.id, "scoring-default");
        assert_eq!(rule.spec.weights.deviation, 30.0);
        assert_eq!(rule.spec.weights.velocity, 35.0);
        assert_eq!(rule.spec.gate.noise_floor, 10.0);
    }

    #[test]
    fn shipped_yaml_matches_built_in_defaults() {
        let rule = ScoringConfigRule::from_yaml(DEFAULT_YAML).unwrap();
        assert_eq!(rule.compile(), ScoringConfigSpec::default());
    }

    #[test]
    fn partial_spec_fills_defaults() {
        let yaml = r#"
apiVersion: v1
kind: ScoringConfig
metadata:
  id: scoring-strict
  name: Strict
spec:
  weights:
    device: 40.0
  gate:
    noise_floor: 25.0
"#;
        let rule = ScoringConfigRule::from_yaml(yaml).unwrap();
        assert!(rule.metadata.enabled);
        assert_eq!(rule.spec.weights.device, 40.0);
        assert_eq!(rule.spec.weights.deviation, 30.0);
        assert_eq!(rule.spec.gate.noise_floor, 25.0);
        assert!(rule.spec.gate.enabled);
        assert_eq!(rule.spec.gate.max_score, 100.0);
        assert_eq!(rule.spec.algorithm_version, "2.1.0");
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let yaml = r#"
apiVersion: v1
kind: TrendConfig
metadata:
  id: x
  name: x
spec: {}
"#;
        let err = ScoringConfigRule::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, RuleError::Validation(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = r#"
apiVersion: v1
kind: ScoringConfig
metadata:
  id: x
  name: x
spec:
  weights:
    deviaton: 10.0
"#;
        assert!(matches!(
            ScoringConfigRule::from_yaml(yaml),
            Err(RuleError::Parse(_))
        ));
    }

    #[test]
    fn round_trip() {
        let rule = ScoringConfigRule::from_yaml(DEFAULT_YAML).unwrap();
        let serialized = rule.to_yaml().unwrap();
        let rule2 = ScoringConfigRule::from_yaml(&serialized).unwrap();
        assert_eq!(rule, rule2);
    }

    #[test]
    fn weights_iterate_in_signal_order() {
        let names: Vec<_> = SignalWeights::default().iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["deviation", "frequency", "temporal", "spatial", "velocity", "device"]
        );
    }
}
