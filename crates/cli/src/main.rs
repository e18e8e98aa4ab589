mod cli;
mod commands;
mod config;
mod input;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::cli::{CliArgs, Command};
use crate::commands::ScoreOptions;
use crate::config::CliConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    vigil_core::config::load_dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::resolve(&args);
    config.runtime.log_summary();
    debug!(command = ?args.command, "dispatching");

    match &args.command {
        Command::Score {
            input,
            pretty,
            threads,
            no_cache,
            stream,
            watch,
        } => commands::score(
            &config,
            ScoreOptions {
                input: input.as_deref(),
                pretty: *pretty,
                threads: *threads,
                no_cache: *no_cache,
                stream: *stream,
                watch: *watch,
            },
        ),
        Command::Validate { file } => commands::validate(&config, file.as_deref()),
        Command::Key { input } => commands::key(&config, input.as_deref()),
    }
}
