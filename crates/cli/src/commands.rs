use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::{info, warn};
use vigil_compute::{
    cache_key, AnomalyScorer, BatchScorer, BundleScorer, CachedScorer, LruScoreCache, NoCache,
    ScoreCache,
};
use vigil_core::{AnomalyScoreResult, PatternData, VigilError};
use vigil_rules::validation::{validate_yaml, ValidationResult};

use crate::config::CliConfig;
use crate::input::{parse_bundles, parse_line, read_input};

pub struct ScoreOptions<'a> {
    pub input: Option<&'a Path>,
    pub pretty: bool,
    pub threads: Option<usize>,
    pub no_cache: bool,
    pub stream: bool,
    pub watch: bool,
}

/// Cache chosen for this run, plus the concrete LRU when one is active so
/// its statistics can be reported.
fn build_cache(capacity: usize) -> (Arc<dyn ScoreCache>, Option<Arc<LruScoreCache>>) {
    if capacity == 0 {
        return (Arc::new(NoCache), None);
    }
    let lru = Arc::new(LruScoreCache::new(capacity));
    (lru.clone(), Some(lru))
}

fn render(value: &serde_json::Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

fn outcome_json(
    index: usize,
    outcome: &std::result::Result<AnomalyScoreResult, VigilError>,
) -> Result<serde_json::Value> {
    Ok(match outcome {
        Ok(result) => serde_json::to_value(result)?,
        Err(e) => json!({ "index": index, "error": e.to_string() }),
    })
}

pub fn score(config: &CliConfig, opts: ScoreOptions<'_>) -> Result<()> {
    let mut store = config.open_store()?;
    let (cache, lru) = build_cache(config.cache_capacity(opts.no_cache));
    let scorer = CachedScorer::new(AnomalyScorer::live(store.handle()), cache);

    let rejected = if opts.stream {
        if opts.watch || config.runtime.scoring.watch_config {
            if store.path().is_some() {
                store.watch().context("failed to watch scoring config")?;
            } else {
                warn!("no scoring config file to watch, using built-in defaults");
            }
        }
        score_stream(&scorer, opts.pretty)?
    } else {
        score_batch(config, scorer, &opts)?
    };

    if let Some(lru) = lru {
        info!(
            entries = lru.len(),
            hit_rate = lru.hit_rate(),
            "score cache statistics"
        );
    }
    if rejected > 0 {
        bail!("{rejected} bundle(s) rejected");
    }
    Ok(())
}

fn score_batch<S: BundleScorer>(
    config: &CliConfig,
    scorer: S,
    opts: &ScoreOptions<'_>,
) -> Result<usize> {
    let text = read_input(opts.input)?;
    let bundles = parse_bundles(&text)?;
    let batch = BatchScorer::new(scorer, config.worker_threads(opts.threads))?;
    let outcomes = batch.score_all(&bundles);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut rejected = 0;
    for (i, outcome) in outcomes.iter().enumerate() {
        if outcome.is_err() {
            rejected += 1;
        }
        writeln!(out, "{}", render(&outcome_json(i, outcome)?, opts.pretty)?)?;
    }
    Ok(rejected)
}

fn score_stream<S: BundleScorer>(scorer: &S, pretty: bool) -> Result<usize> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut rejected = 0;
    for (i, line) in stdin.lock().lines().enumerate() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let value = match parse_line(&line) {
            Ok(data) => outcome_json(i, &scorer.score(&data))?,
            Err(e) => json!({ "index": i, "error": format!("{e:#}") }),
        };
        if value.get("error").is_some() {
            rejected += 1;
        }
        let mut out = stdout.lock();
        writeln!(out, "{}", render(&value, pretty)?)?;
        out.flush()?;
    }
    Ok(rejected)
}

/// Human-readable validation report.
pub fn format_report(path: &Path, report: &ValidationResult) -> String {
    let mut lines = Vec::new();
    let status = if report.valid { "valid" } else { "INVALID" };
    lines.push(format!(
        "{}: {} ({} error(s), {} warning(s))",
        path.display(),
        status,
        report.errors.len(),
        report.warnings.len()
    ));
    for e in &report.errors {
        lines.push(format!("  error   {}: {}", display_path(&e.path), e.message));
    }
    for w in &report.warnings {
        lines.push(format!("  warning {}: {}", display_path(&w.path), w.message));
    }
    lines.join("\n")
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<document>"
    } else {
        path
    }
}

pub fn validate(config: &CliConfig, file: Option<&Path>) -> Result<()> {
    let path = file.unwrap_or_else(|| config.config_path());
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let report = validate_yaml(&yaml);
    println!("{}", format_report(path, &report));
    if !report.valid {
        bail!("{} is invalid", path.display());
    }
    Ok(())
}

pub fn key(config: &CliConfig, input: Option<&Path>) -> Result<()> {
    let store = config.open_store()?;
    let version = store.current().algorithm_version.clone();
    let bundles = parse_bundles(&read_input(input)?)?;
    let keys = bundle_keys(&bundles, &version)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for key in keys {
        writeln!(out, "{key}")?;
    }
    Ok(())
}

/// Cache keys for `bundles`. Fails on the first bundle the scorer would reject.
fn bundle_keys(bundles: &[PatternData], version: &str) -> Result<Vec<String>> {
    bundles
        .iter()
        .enumerate()
        .map(|(i, data)| {
            data.validate()
                .with_context(|| format!("bundle #{i} is invalid"))?;
            Ok(cache_key(data, version)?)
        })
        .collect()
}
