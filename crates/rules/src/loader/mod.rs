//! File-backed scoring config store with hot-reload via `notify` watcher.
//!
//! Watches the directory holding the scoring config for changes to that file
//! and swaps the active config in place. Invalid edits are logged and the
//! previous config stays active.

mod core;
mod error;
mod watcher;

#[cfg(test)]
mod tests;

pub use self::core::{ConfigHandle, ScoringConfigStore};
pub use self::error::{Result, RuleError};
