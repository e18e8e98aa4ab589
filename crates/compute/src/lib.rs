pub mod algorithms;
pub mod batch;
pub mod cache;
pub mod engine;
pub mod pipeline;

pub use batch::BatchScorer;
pub use cache::{cache_key, CachedScorer, LruScoreCache, NoCache, ScoreCache};
pub use engine::{score_all, AnomalyScorer, BundleScorer};
pub use pipeline::anomaly::{classify_risk, score_pattern};
