//! nixlayer - layered configuration and environment lifecycle for Nix setups
//!
//! Personal, team and project config documents are merged into one effective
//! configuration, rendered into named environment directories, and activated
//! by repointing a single `current` symlink. Every state-changing operation
//! runs behind a safety snapshot and rolls back automatically on failure.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod settings;

pub use application::{InitReport, InitUseCase, SwitchCoordinator, SwitchReport, SwitchState};
pub use domain::entities::{Backup, Config, Environment, EnvironmentTemplate};
pub use domain::services::ConflictReport;
pub use domain::value_objects::{EnvironmentName, Layer, LayerKind, RollbackSelector};
pub use error::{NixlayerError, NixlayerResult};
pub use infrastructure::{
    BackupManager, CommandApplier, ConfigStore, EnvironmentRegistry, NoopApplier,
    PlaceholderRenderer, StateLayout, TarGzArchiver,
};
pub use settings::Settings;
