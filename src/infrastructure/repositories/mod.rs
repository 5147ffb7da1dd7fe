//! Repository Implementations
//!
//! Everything that owns a part of the state directory:
//! - `ConfigStore` - layered config documents and the custom package list
//! - `EnvironmentRegistry` - environment directories and the `current` pointer
//! - `BackupManager` - snapshot archives in `backups/`

mod backup_manager;
mod config_store;
mod environment_registry;

pub use backup_manager::BackupManager;
pub use config_store::ConfigStore;
pub use environment_registry::{EnvironmentRegistry, DEFAULT_ENVIRONMENT};
