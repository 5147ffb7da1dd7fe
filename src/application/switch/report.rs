//! Results of coordinator operations

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::entities::{Backup, Config};

use super::state::SwitchState;

/// Outcome of a committed switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchReport {
    /// Environment the pointer addressed before the switch, if any.
    pub from: Option<String>,
    pub to: String,
    /// Safety snapshot taken before repointing.
    pub snapshot: PathBuf,
    pub state: SwitchState,
}

/// Outcome of a committed apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub environment: String,
    pub snapshot: PathBuf,
    pub packages: usize,
    pub applier: String,
}

/// Outcome of a committed project import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub snapshot: PathBuf,
    pub config: Config,
}

/// Outcome of a committed rollback or restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackReport {
    /// The backup that was restored.
    pub restored: Backup,
    /// Snapshot of the state right before the restore.
    pub snapshot: PathBuf,
}
