//! Scenario: moving between environments
//!
//! Journey: a developer initializes nixlayer, creates a "work" environment,
//! switches to it, then tries to switch while their personal and project
//! configs disagree, and finally hits an activation failure.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use nixlayer::domain::ports::{ApplyError, ConfigApplier, ToolOutput};
use nixlayer::{
    InitUseCase, Layer, NixlayerError, NoopApplier, PlaceholderRenderer, StateLayout,
    SwitchCoordinator, SwitchState, TarGzArchiver,
};
use tempfile::TempDir;

use crate::common::*;

/// Fails the first `failures` activations, then succeeds.
struct FlakyApplier {
    failures: Cell<u32>,
}

impl ConfigApplier for FlakyApplier {
    fn name(&self) -> &str {
        "flaky"
    }

    fn apply(&self, _: &Path) -> Result<ToolOutput, ApplyError> {
        let left = self.failures.get();
        if left == 0 {
            return Ok(ToolOutput::default());
        }
        self.failures.set(left - 1);
        Err(ApplyError::Failed {
            tool: "flaky".into(),
            code: Some(42),
            stderr: "injected failure".into(),
        })
    }
}

fn initialized<P: ConfigApplier>(
    applier: P,
) -> (TempDir, SwitchCoordinator<TarGzArchiver, P, PlaceholderRenderer>) {
    let dir = TempDir::new().unwrap();
    let coordinator = SwitchCoordinator::new(
        StateLayout::new(dir.path()),
        TarGzArchiver::new(),
        applier,
        PlaceholderRenderer,
    );
    InitUseCase::new(
        coordinator.store(),
        coordinator.registry(),
        coordinator.template(),
    )
    .execute()
    .unwrap();
    (dir, coordinator)
}

fn pointer(dir: &TempDir) -> PathBuf {
    fs::read_link(dir.path().join("current")).unwrap()
}

/// SCENARIO: create "work" and switch to it with no conflicts.
#[test]
fn scenario_create_and_switch() {
    let (dir, coordinator) = initialized(NoopApplier);

    coordinator.create_environment("work").unwrap();
    let report = coordinator.switch("work", false).unwrap();

    assert_eq!(report.state, SwitchState::Committed);
    assert_eq!(report.from.as_deref(), Some("default"));
    assert_eq!(pointer(&dir), PathBuf::from("environments/work"));
    assert_eq!(
        coordinator.registry().resolve_current().unwrap(),
        dir.path().join("environments/work").canonicalize().unwrap()
    );
}

/// SCENARIO: personal zsh against project bash blocks a switch.
#[test]
fn scenario_conflicting_layers_block_switch() {
    let (dir, coordinator) = initialized(NoopApplier);
    fs::write(dir.path().join("personal.yaml"), PERSONAL_ZSH).unwrap();
    fs::write(dir.path().join("project.yaml"), PROJECT_BASH).unwrap();

    let err = coordinator.switch("staging", false).unwrap_err();

    match &err {
        NixlayerError::Conflict { report } => assert_eq!(
            report.conflicts(),
            ["shell type mismatch: personal=zsh, project=bash"]
        ),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(pointer(&dir), PathBuf::from("environments/default"));
    assert!(coordinator.backups().list().unwrap().is_empty());

    // Aligning the layers clears the way.
    fs::write(dir.path().join("personal.yaml"), PERSONAL_BASH).unwrap();
    coordinator.create_environment("staging").unwrap();
    coordinator.switch("staging", false).unwrap();
    assert_eq!(pointer(&dir), PathBuf::from("environments/staging"));
}

/// SCENARIO: activation fails mid-switch; the pointer comes back and the
/// error names the failure and the snapshot. A retry then succeeds.
#[test]
fn scenario_failed_activation_then_retry() {
    let (dir, coordinator) = initialized(FlakyApplier {
        failures: Cell::new(1),
    });
    coordinator.create_environment("work").unwrap();

    let err = coordinator.switch("work", false).unwrap_err();

    let NixlayerError::RolledBack { original, snapshot } = &err else {
        panic!("expected rolled-back error, got {err:?}");
    };
    assert!(original.to_string().contains("injected failure"));
    assert!(snapshot.is_file());
    assert!(err.to_string().contains("rolled back to"));
    assert_eq!(pointer(&dir), PathBuf::from("environments/default"));

    coordinator.switch("work", false).unwrap();
    assert_eq!(pointer(&dir), PathBuf::from("environments/work"));
    assert_eq!(coordinator.backups().list().unwrap().len(), 2);
}

/// SCENARIO: a project import, then undoing it with a rollback.
#[test]
fn scenario_import_then_rollback() {
    let (dir, coordinator) = initialized(NoopApplier);
    let source = dir.path().join("incoming.yaml");
    fs::write(&source, PROJECT_BASH).unwrap();

    let report = coordinator.import_project(&source, false).unwrap();
    assert!(coordinator.store().exists(&Layer::Project));

    coordinator
        .restore(&report.snapshot.file_name().unwrap().to_string_lossy())
        .unwrap();

    assert!(!coordinator.store().exists(&Layer::Project));
}
