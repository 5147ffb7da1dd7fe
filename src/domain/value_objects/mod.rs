//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod backup_id;
mod config_warning;
mod layer;
mod names;
mod tool_kind;

pub use backup_id::{
    parse_duration, BackupTimestamp, RollbackSelector, TIMESTAMP_FORMAT, TIMESTAMP_LEN,
};
pub use config_warning::ConfigWarning;
pub use layer::{Layer, LayerKind};
pub use names::{validate_label, validate_team_name, EnvironmentName};
pub use tool_kind::{allowed_names, EditorKind, ShellKind};
