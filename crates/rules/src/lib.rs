//! Scoring configuration as a YAML rule document.
//!
//! This crate provides:
//! - The `ScoringConfig` rule kind with serde defaults for every tunable
//! - Validation with blocking errors and advisory warnings
//! - A file-backed config store with hot-reload via `notify` watcher

pub mod loader;
pub mod scoring_config;
pub mod validation;

pub use loader::{ConfigHandle, RuleError, ScoringConfigStore};
pub use scoring_config::{CompiledScoringConfig, ScoringConfigRule, ScoringConfigSpec};
