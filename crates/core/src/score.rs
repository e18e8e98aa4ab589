use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The six behavioral signal scorers, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Deviation,
    Frequency,
    Temporal,
    Spatial,
    Velocity,
    Device,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Deviation,
        Algorithm::Frequency,
        Algorithm::Temporal,
        Algorithm::Spatial,
        Algorithm::Velocity,
        Algorithm::Device,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Deviation => "deviation",
            Algorithm::Frequency => "frequency",
            Algorithm::Temporal => "temporal",
            Algorithm::Spatial => "spatial",
            Algorithm::Velocity => "velocity",
            Algorithm::Device => "device",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one signal scorer for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub algorithm: Algorithm,
    /// Non-negative contribution before ensemble weighting.
    pub score: f64,
    /// How much the scorer trusts its own score, in [0, 1].
    pub confidence: f64,
    /// Intermediate values that explain the score (z-score, ratio, novelty, ...).
    #[serde(default)]
    pub factors: BTreeMap<String, serde_json::Value>,
}

impl ScoreComponent {
    pub fn new(algorithm: Algorithm, score: f64, confidence: f64) -> Self {
        Self {
            algorithm,
            score,
            confidence,
            factors: BTreeMap::new(),
        }
    }

    /// Attach an explanatory factor.
    pub fn with_factor(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.factors.insert(name.to_string(), value.into());
        self
    }
}

/// Coarse label for a final score. Ranking aid only, not a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Classify against ascending boundaries; each boundary is inclusive.
    pub fn from_score_with(score: f64, low: f64, medium: f64, high: f64, critical: f64) -> Self {
        if score >= critical {
            RiskLevel::Critical
        } else if score >= high {
            RiskLevel::High
        } else if score >= medium {
            RiskLevel::Medium
        } else if score >= low {
            RiskLevel::Low
        } else {
            RiskLevel::None
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::None => "none",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Final outcome of scoring one [`crate::PatternData`] bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyScoreResult {
    /// Gated ensemble score in [0, 100].
    pub total_score: f64,
    /// One component per signal that had data, in evaluation order.
    pub components: Vec<ScoreComponent>,
    /// Overall confidence in [0, 1].
    pub confidence: f64,
    pub risk_level: RiskLevel,
    /// Changes whenever formulas or weights change, so consumers can detect scale shifts.
    pub algorithm_version: String,
}

impl AnomalyScoreResult {
    /// Result for a bundle where no signal had data.
    pub fn empty(algorithm_version: impl Into<String>) -> Self {
        Self {
            total_score: 0.0,
            components: Vec::new(),
            confidence: 0.0,
            risk_level: RiskLevel::None,
            algorithm_version: algorithm_version.into(),
        }
    }

    pub fn component(&self, algorithm: Algorithm) -> Option<&ScoreComponent> {
        self.components.iter().find(|c| c.algorithm == algorithm)
    }
}
