use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    profiled_env_opt(profile, key)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub scoring: ScoringRuntimeConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `VIGIL_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("VIGIL_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            scoring: ScoringRuntimeConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  scoring:     config={}", self.scoring.config_path.display());
        tracing::info!(
            "  runtime:     workers={}, cache_capacity={}, watch={}",
            self.scoring.resolved_worker_threads(),
            self.scoring.cache_capacity,
            self.scoring.watch_config
        );
    }
}

// ── Scoring runtime ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRuntimeConfig {
    /// Path to the ScoringConfig YAML document.
    pub config_path: PathBuf,
    /// Reload the scoring config when the file changes.
    pub watch_config: bool,
    /// Batch worker threads. 0 = available parallelism.
    pub worker_threads: usize,
    /// Result cache entries. 0 = caching disabled.
    pub cache_capacity: usize,
}

impl ScoringRuntimeConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            config_path: PathBuf::from(profiled_env_or(
                p,
                "SCORING_CONFIG_PATH",
                "data/rules/scoring/scoring-config.yml",
            )),
            watch_config: profiled_env_bool(p, "SCORING_WATCH_CONFIG", false),
            worker_threads: profiled_env_usize(p, "SCORING_WORKER_THREADS", 0),
            cache_capacity: profiled_env_usize(p, "SCORING_CACHE_CAPACITY", 10_000),
        }
    }

    /// Resolve worker thread count (0 means use available parallelism).
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.worker_threads
        }
    }
}

impl Default for ScoringRuntimeConfig {
    fn default() -> Self {
        Self::from_env_profiled("")
    }
}
