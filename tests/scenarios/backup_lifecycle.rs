//! Scenario: snapshots of the state directory
//!
//! Backups are taken, listed, restored and pruned through the public
//! manager, with explicit timestamps so ordering is deterministic.

use std::fs;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use nixlayer::domain::value_objects::BackupTimestamp;
use nixlayer::{BackupManager, NixlayerError, RollbackSelector, StateLayout, TarGzArchiver};
use tempfile::TempDir;

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 17)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn manager() -> (TempDir, BackupManager<TarGzArchiver>) {
    let dir = TempDir::new().unwrap();
    let layout = StateLayout::new(dir.path());
    layout.ensure_dirs().unwrap();
    (dir, BackupManager::new(layout, TarGzArchiver::new()))
}

/// SCENARIO: three backups, delete the middle one.
#[test]
fn scenario_list_and_delete() {
    let (_dir, manager) = manager();
    let t1 = manager.create_at(None, BackupTimestamp::new(at(9, 0))).unwrap();
    let t2 = manager.create_at(None, BackupTimestamp::new(at(10, 0))).unwrap();
    let t3 = manager.create_at(None, BackupTimestamp::new(at(11, 0))).unwrap();

    assert_eq!(manager.list().unwrap(), [t1.clone(), t2.clone(), t3.clone()]);

    manager.delete(&t2.timestamp.to_string()).unwrap();
    assert_eq!(manager.list().unwrap(), [t1, t3]);
}

/// SCENARIO: restore reproduces the exact prior tree, symlinks included.
#[test]
fn scenario_restore_reproduces_tree() {
    let (dir, manager) = manager();
    let root = dir.path();
    fs::write(root.join("personal.yaml"), "personal").unwrap();
    fs::create_dir_all(root.join("environments/work")).unwrap();
    fs::write(root.join("environments/work/home.nix"), "home").unwrap();
    #[cfg(unix)]
    std::os::unix::fs::symlink("environments/work", root.join("current")).unwrap();

    let backup = manager.create(Some("before")).unwrap();

    fs::write(root.join("personal.yaml"), "changed").unwrap();
    fs::write(root.join("stray.txt"), "new").unwrap();
    fs::remove_dir_all(root.join("environments/work")).unwrap();

    manager.restore(&backup).unwrap();

    assert_eq!(fs::read_to_string(root.join("personal.yaml")).unwrap(), "personal");
    assert_eq!(
        fs::read_to_string(root.join("environments/work/home.nix")).unwrap(),
        "home"
    );
    assert!(!root.join("stray.txt").exists());
    #[cfg(unix)]
    assert_eq!(
        fs::read_link(root.join("current")).unwrap(),
        std::path::PathBuf::from("environments/work")
    );
    assert!(backup.path.is_file());
}

/// SCENARIO: "2h" picks the newest backup inside the window.
#[test]
fn scenario_rollback_window() {
    let (_dir, manager) = manager();
    manager.create_at(None, BackupTimestamp::new(at(7, 0))).unwrap();
    let recent = manager.create_at(None, BackupTimestamp::new(at(11, 0))).unwrap();
    let now = at(12, 0);

    let selector = RollbackSelector::parse("2h").unwrap();
    assert_eq!(manager.resolve(&selector, now).unwrap(), recent);

    let later = now + TimeDelta::hours(5);
    let err = manager.resolve(&selector, later).unwrap_err();
    assert!(matches!(err, NixlayerError::NotFound { what: "backup", .. }));
}
