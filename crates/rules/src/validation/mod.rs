//! ScoringConfig validation with structured errors and warnings.
//!
//! Errors block a config from being loaded (or hot-reloaded); warnings are
//! advisory and only logged.

mod config_checks;

use serde::{Deserialize, Serialize};

use crate::scoring_config::ScoringConfigRule;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// YAML path of the offending value, e.g. `"spec.gate.noise_floor"`.
    pub path: String,
    pub message: String,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// One-line summary of all errors, for log lines and error values.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a parsed [`ScoringConfigRule`].
pub fn validate_scoring_config(rule: &ScoringConfigRule) -> ValidationResult {
    let mut result = ValidationResult::new();
    config_checks::validate_metadata(rule, &mut result);
    config_checks::validate_weights(&rule.spec.weights, &mut result);
    config_checks::validate_gate(&rule.spec.gate, &mut result);
    config_checks::validate_signal_params(&rule.spec.signal_params, &mut result);
    config_checks::validate_risk_thresholds(&rule.spec.risk_thresholds, &mut result);
    config_checks::validate_algorithm_version(&rule.spec.algorithm_version, &mut result);
    result
}

/// Parse raw YAML and validate. Returns parse errors merged with validation errors.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    match ScoringConfigRule::from_yaml(yaml) {
        Ok(rule) => validate_scoring_config(&rule),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", e.to_string());
            result
        }
    }
}
