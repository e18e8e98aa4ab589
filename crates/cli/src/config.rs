use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;
use vigil_core::Config;
use vigil_rules::ScoringConfigStore;

use crate::cli::CliArgs;

/// Runtime settings for one CLI invocation.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub runtime: Config,
    /// True when `--config` named the scoring config explicitly.
    pub explicit_config: bool,
}

impl CliConfig {
    /// Environment config with command-line overrides applied.
    pub fn resolve(args: &CliArgs) -> Self {
        let mut runtime = match &args.profile {
            Some(profile) => Config::for_profile(profile),
            None => Config::from_env(),
        };
        if let Some(path) = &args.config {
            runtime.scoring.config_path = path.clone();
        }
        Self {
            runtime,
            explicit_config: args.config.is_some(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.runtime.scoring.config_path
    }

    /// Open the scoring config store.
    ///
    /// A missing file is an error only when it was named explicitly;
    /// otherwise the built-in defaults are used.
    pub fn open_store(&self) -> Result<ScoringConfigStore> {
        let path = self.config_path();
        if !self.explicit_config && !path.exists() {
            warn!(
                path = %path.display(),
                "scoring config not found, using built-in defaults"
            );
            return Ok(ScoringConfigStore::default());
        }
        ScoringConfigStore::open(path)
            .with_context(|| format!("failed to load scoring config {}", path.display()))
    }

    /// Result cache capacity; 0 disables caching.
    pub fn cache_capacity(&self, no_cache: bool) -> usize {
        if no_cache {
            0
        } else {
            self.runtime.scoring.cache_capacity
        }
    }

    pub fn worker_threads(&self, overridden: Option<usize>) -> usize {
        match overridden {
            Some(n) if n > 0 => n,
            _ => self.runtime.scoring.resolved_worker_threads(),
        }
    }
}
