//! Memoization of scoring results by a stable hash of the input bundle.
//!
//! The cache is optional: [`NoCache`] turns it off, and scoring is correct
//! without one. Keys include the algorithm version, so changing weights or
//! formulas never serves results computed under the old scale.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lru::LruCache;
use sha2::{Digest, Sha256};
use tracing::debug;
use vigil_core::{AnomalyScoreResult, PatternData, Result, VigilError};

use crate::engine::BundleScorer;

/// Prefix shared by every cache key.
pub const KEY_PREFIX: &str = "anomaly_score";

/// Hex digits of the SHA-256 digest kept in a key.
const DIGEST_HEX_LEN: usize = 32;

/// Stable cache key for a bundle under a given algorithm version.
///
/// Format: `anomaly_score:{version}:{first 32 hex chars of SHA-256}`, hashed
/// over the canonical JSON encoding of the bundle.
pub fn cache_key(data: &PatternData, algorithm_version: &str) -> Result<String> {
    let bytes = serde_json::to_vec(data).map_err(|e| VigilError::Serialize(e.to_string()))?;
    let digest = Sha256::digest(&bytes);
    let hex = format!("{digest:x}");
    Ok(format!(
        "{KEY_PREFIX}:{algorithm_version}:{}",
        &hex[..DIGEST_HEX_LEN]
    ))
}

/// Swappable result store keyed by [`cache_key`].
pub trait ScoreCache: Send + Sync {
    fn get(&self, key: &str) -> Option<AnomalyScoreResult>;
    fn put(&self, key: String, result: AnomalyScoreResult);
}

impl<T: ScoreCache + ?Sized> ScoreCache for Arc<T> {
    fn get(&self, key: &str) -> Option<AnomalyScoreResult> {
        (**self).get(key)
    }

    fn put(&self, key: String, result: AnomalyScoreResult) {
        (**self).put(key, result)
    }
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl ScoreCache for NoCache {
    fn get(&self, _key: &str) -> Option<AnomalyScoreResult> {
        None
    }

    fn put(&self, _key: String, _result: AnomalyScoreResult) {}
}

/// In-process LRU cache with hit/miss counters.
pub struct LruScoreCache {
    cache: Mutex<LruCache<String, AnomalyScoreResult>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LruScoreCache {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().expect("score cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScoreCache for LruScoreCache {
    fn get(&self, key: &str) -> Option<AnomalyScoreResult> {
        let found = self
            .cache
            .lock()
            .expect("score cache lock poisoned")
            .get(key)
            .cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    fn put(&self, key: String, result: AnomalyScoreResult) {
        self.cache
            .lock()
            .expect("score cache lock poisoned")
            .put(key, result);
    }
}

/// Scorer wrapper that consults a [`ScoreCache`] first.
///
/// Invalid bundles are rejected before the cache is touched, and errors are
/// never cached.
pub struct CachedScorer<S, C> {
    inner: S,
    cache: C,
}

impl<S: BundleScorer, C: ScoreCache> CachedScorer<S, C> {
    pub fn new(inner: S, cache: C) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: BundleScorer, C: ScoreCache> BundleScorer for CachedScorer<S, C> {
    fn score(&self, data: &PatternData) -> Result<AnomalyScoreResult> {
        data.validate()?;
        let key = cache_key(data, &self.inner.algorithm_version())?;
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "score cache hit");
            return Ok(hit);
        }
        let result = self.inner.score(data)?;
        self.cache.put(key, result.clone());
        Ok(result)
    }

    fn algorithm_version(&self) -> String {
        self.inner.algorithm_version()
    }
}
