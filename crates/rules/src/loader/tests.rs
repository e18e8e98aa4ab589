//! Tests for the scoring config store.

use std::fs;

use notify::event::{DataChange, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tempfile::TempDir;

use super::watcher::handle_fs_event;
use super::*;

const DEFAULT_YAML: &str = include_str!("../../../../data/rules/scoring/scoring-config.yml");

const STRICT_YAML: &str = r#"
apiVersion: v1
kind: ScoringConfig
metadata:
  id: scoring-strict
  name: Strict
spec:
  algorithm_version: "2.2.0"
  gate:
    noise_floor: 25.0
"#;

const INVALID_YAML: &str = r#"
apiVersion: v1
kind: ScoringConfig
metadata:
  id: scoring-broken
  name: Broken
spec:
  gate:
    noise_floor: -5.0
"#;

fn temp_store(contents: &str) -> (TempDir, std::path::PathBuf, ScoringConfigStore) {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join("scoring-config.yml");
    fs::write(&path, contents).unwrap();
    let store = ScoringConfigStore::open(&path).expect("open store");
    (dir, path, store)
}

fn modify_event(path: &std::path::Path) -> Event {
    Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(path.to_path_buf())
}

#[test]
fn open_loads_default_config() {
    let (_dir, path, store) = temp_store(DEFAULT_YAML);
    assert_eq!(store.path(), Some(path.as_path()));
    assert_eq!(store.current().algorithm_version, "2.1.0");
    assert_eq!(store.current().gate.noise_floor, 10.0);
}

#[test]
fn open_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let err = ScoringConfigStore::open(dir.path().join("nope.yml")).err().unwrap();
    assert!(matches!(err, RuleError::Io(_)));
}

#[test]
fn open_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.yml");
    fs::write(&path, INVALID_YAML).unwrap();
    let err = ScoringConfigStore::open(&path).err().unwrap();
    match err {
        RuleError::Validation(msg) => assert!(msg.contains("noise_floor")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reload_picks_up_changes() {
    let (_dir, path, store) = temp_store(DEFAULT_YAML);
    let before = store.current();

    fs::write(&path, STRICT_YAML).unwrap();
    let after = store.reload().unwrap();

    assert_eq!(after.algorithm_version, "2.2.0");
    assert_eq!(store.current().gate.noise_floor, 25.0);
    // Snapshots handed out earlier are untouched.
    assert_eq!(before.algorithm_version, "2.1.0");
}

#[test]
fn reload_keeps_previous_on_invalid_file() {
    let (_dir, path, store) = temp_store(DEFAULT_YAML);
    fs::write(&path, INVALID_YAML).unwrap();
    assert!(store.reload().is_err());
    assert_eq!(store.current().gate.noise_floor, 10.0);
}

#[test]
fn in_memory_store_cannot_reload_or_watch() {
    let mut store = ScoringConfigStore::default();
    assert!(store.path().is_none());
    assert!(matches!(store.reload(), Err(RuleError::Validation(_))));
    assert!(matches!(store.watch(), Err(RuleError::Validation(_))));
}

#[test]
fn disabled_config_falls_back_to_defaults() {
    let yaml = STRICT_YAML.replace("name: Strict", "name: Strict\n  enabled: false");
    let (_dir, _path, store) = temp_store(&yaml);
    assert_eq!(*store.current(), crate::ScoringConfigSpec::default());
}

#[test]
fn fs_event_for_config_file_swaps_config() {
    let (_dir, path, store) = temp_store(DEFAULT_YAML);
    fs::write(&path, STRICT_YAML).unwrap();

    assert!(handle_fs_event(&modify_event(&path), store.shared(), &path));
    assert_eq!(store.current().algorithm_version, "2.2.0");
}

#[test]
fn fs_event_for_other_file_is_ignored() {
    let (dir, path, store) = temp_store(DEFAULT_YAML);
    fs::write(&path, STRICT_YAML).unwrap();
    let other = dir.path().join("notes.yml");

    assert!(!handle_fs_event(&modify_event(&other), store.shared(), &path));
    assert_eq!(store.current().algorithm_version, "2.1.0");
}

#[test]
fn fs_remove_event_keeps_config() {
    let (_dir, path, store) = temp_store(DEFAULT_YAML);
    let event = Event::new(EventKind::Remove(RemoveKind::File)).add_path(path.clone());
    assert!(!handle_fs_event(&event, store.shared(), &path));
    assert_eq!(store.current().algorithm_version, "2.1.0");
}

#[test]
fn fs_event_with_invalid_contents_keeps_previous() {
    let (_dir, path, store) = temp_store(DEFAULT_YAML);
    fs::write(&path, INVALID_YAML).unwrap();
    assert!(!handle_fs_event(&modify_event(&path), store.shared(), &path));
    assert_eq!(store.current().gate.noise_floor, 10.0);
}

#[test]
fn handle_follows_reloads() {
    let (_dir, path, store) = temp_store(DEFAULT_YAML);
    let handle = store.handle();
    assert_eq!(handle.current().algorithm_version, "2.1.0");

    fs::write(&path, STRICT_YAML).unwrap();
    store.reload().unwrap();
    assert_eq!(handle.clone().current().algorithm_version, "2.2.0");
}
