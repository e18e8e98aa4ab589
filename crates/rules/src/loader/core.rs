//! Core [`ScoringConfigStore`] struct: file-backed config with optional hot-reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::scoring_config::{CompiledScoringConfig, ScoringConfigRule, ScoringConfigSpec};
use crate::validation::validate_scoring_config;

use super::error::{Result, RuleError};
use super::watcher::handle_fs_event;

/// Holds the active scoring config and swaps it when the backing file changes.
///
/// Readers take a cheap `Arc` snapshot via [`current()`](Self::current); a
/// reload never mutates a config that is already handed out.
#[derive(Debug)]
pub struct ScoringConfigStore {
    /// YAML file backing this store, if any.
    path: Option<PathBuf>,
    /// Active compiled config.
    current: Arc<RwLock<Arc<CompiledScoringConfig>>>,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl ScoringConfigStore {
    /// Load and validate the config at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = load_config_file(&path)?;
        info!(
            path = %path.display(),
            version = %config.algorithm_version,
            "loaded scoring config"
        );
        Ok(Self {
            path: Some(path),
            current: Arc::new(RwLock::new(Arc::new(config))),
            _watcher: None,
        })
    }

    /// In-memory store with a fixed config and no backing file.
    pub fn from_config(config: CompiledScoringConfig) -> Self {
        Self {
            path: None,
            current: Arc::new(RwLock::new(Arc::new(config))),
            _watcher: None,
        }
    }

    /// Snapshot of the active config.
    pub fn current(&self) -> Arc<CompiledScoringConfig> {
        Arc::clone(&self.current.read().expect("scoring config lock poisoned"))
    }

    /// Re-read the backing file now. On failure the previous config is kept.
    pub fn reload(&self) -> Result<Arc<CompiledScoringConfig>> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| RuleError::Validation("store has no backing file".to_string()))?;
        let config = Arc::new(load_config_file(path)?);
        *self.current.write().expect("scoring config lock poisoned") = Arc::clone(&config);
        info!(path = %path.display(), version = %config.algorithm_version, "reloaded scoring config");
        Ok(config)
    }

    /// Start a filesystem watcher with 500ms debounce.
    ///
    /// The parent directory is watched so that editors which save via
    /// rename-over are picked up. Only events for the config file itself
    /// trigger a reload.
    pub fn watch(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| RuleError::Validation("store has no backing file".to_string()))?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let current = Arc::clone(&self.current);
        let watched = path.clone();
        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    handle_fs_event(&event, &current, &watched);
                }
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let _ = watcher.configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(path = %path.display(), "watching scoring config for changes");
        self._watcher = Some(watcher);
        Ok(())
    }

    /// Backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Cloneable read handle that follows hot-reloads.
    pub fn handle(&self) -> ConfigHandle {
        ConfigHandle {
            current: Arc::clone(&self.current),
        }
    }

    #[cfg(test)]
    pub(super) fn shared(&self) -> &Arc<RwLock<Arc<CompiledScoringConfig>>> {
        &self.current
    }
}

/// Read-only view of a [`ScoringConfigStore`]'s active config.
///
/// Shares the store's cell, so reloads performed by the store (or its
/// watcher) are visible through every clone.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    current: Arc<RwLock<Arc<CompiledScoringConfig>>>,
}

impl ConfigHandle {
    /// Snapshot of the active config.
    pub fn current(&self) -> Arc<CompiledScoringConfig> {
        Arc::clone(&self.current.read().expect("scoring config lock poisoned"))
    }
}

impl Default for ScoringConfigStore {
    fn default() -> Self {
        Self::from_config(ScoringConfigSpec::default())
    }
}

/// Read, parse, and validate a scoring config file.
///
/// A disabled document yields the built-in defaults. Validation warnings are
/// logged; validation errors reject the file.
pub(super) fn load_config_file(path: &Path) -> Result<CompiledScoringConfig> {
    let contents = fs::read_to_string(path)?;
    let rule = ScoringConfigRule::from_yaml(&contents)?;

    let report = validate_scoring_config(&rule);
    for warning in &report.warnings {
        warn!(path = %path.display(), field = %warning.path, "{}", warning.message);
    }
    if !report.valid {
        return Err(RuleError::Validation(format!(
            "scoring config '{}' is invalid: {}",
            rule.metadata.id,
            report.error_summary()
        )));
    }

    if !rule.metadata.enabled {
        info!(rule_id = %rule.metadata.id, "scoring config disabled, using built-in defaults");
        return Ok(ScoringConfigSpec::default());
    }
    Ok(rule.compile())
}
