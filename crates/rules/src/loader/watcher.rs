//! Filesystem event handler for the notify watcher (hot-reload).

use std::path::Path;
use std::sync::{Arc, RwLock};

use notify::event::{CreateKind, ModifyKind};
use notify::{Event, EventKind};
use tracing::{info, warn};

use crate::scoring_config::CompiledScoringConfig;

use super::core::load_config_file;

/// Handle a single filesystem event from the notify watcher.
///
/// Returns `true` when the active config was replaced.
pub(super) fn handle_fs_event(
    event: &Event,
    current: &Arc<RwLock<Arc<CompiledScoringConfig>>>,
    watched: &Path,
) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Create(CreateKind::File)
            | EventKind::Create(CreateKind::Any)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    );
    if !relevant {
        return false;
    }

    // Compare file names only: the watcher may report canonicalized paths.
    let touches_config = event
        .paths
        .iter()
        .any(|p| p.file_name().is_some() && p.file_name() == watched.file_name());
    if !touches_config {
        return false;
    }

    match load_config_file(watched) {
        Ok(config) => {
            info!(
                path = %watched.display(),
                version = %config.algorithm_version,
                "hot-reloaded scoring config"
            );
            *current.write().expect("scoring config lock poisoned") = Arc::new(config);
            true
        }
        Err(e) => {
            warn!(
                path = %watched.display(),
                error = %e,
                "failed to reload scoring config, keeping previous version"
            );
            false
        }
    }
}
