use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Behavioral anomaly scoring.
///
/// Scores JSON behavioral bundles (deviation, frequency, timing, location,
/// velocity, device) into a 0-100 anomaly score with a per-signal breakdown.
#[derive(Parser, Debug)]
#[command(name = "vigil", about = "Behavioral anomaly scoring engine", version)]
pub struct CliArgs {
    /// Scoring config file (overrides SCORING_CONFIG_PATH)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment profile (overrides VIGIL_PROFILE)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score bundles and print one JSON result per bundle
    Score {
        /// Input file: a single object, an array, or JSON lines ("-" or omitted reads stdin)
        input: Option<PathBuf>,

        /// Pretty-print results
        #[arg(long)]
        pretty: bool,

        /// Worker threads (overrides SCORING_WORKER_THREADS)
        #[arg(long)]
        threads: Option<usize>,

        /// Disable the result cache
        #[arg(long)]
        no_cache: bool,

        /// Score JSON lines from stdin as they arrive until EOF
        #[arg(long, conflicts_with = "input")]
        stream: bool,

        /// Reload the scoring config when it changes (stream mode only)
        #[arg(long, requires = "stream")]
        watch: bool,
    },

    /// Validate a scoring config document and print the report
    Validate {
        /// Config file (defaults to the configured scoring config)
        file: Option<PathBuf>,
    },

    /// Print the cache key of each bundle
    Key {
        /// Input file ("-" or omitted reads stdin)
        input: Option<PathBuf>,
    },
}
