//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `layout` - Paths inside the state directory
//! - `fs/` - Atomic writes, symlink replacement, directory mirroring
//! - `archive/` - Archiver adapters (tar.gz)
//! - `applier` - ConfigApplier adapters (external command, no-op)
//! - `template` - TemplateRenderer adapter
//! - `repositories/` - Config store, environment registry, backup manager

pub mod applier;
pub mod archive;
pub mod fs;
pub mod layout;
pub mod repositories;
pub mod template;

// Re-export for convenience
pub use applier::{CommandApplier, NoopApplier, DEFAULT_APPLY_COMMAND};
pub use archive::TarGzArchiver;
pub use layout::StateLayout;
pub use repositories::{BackupManager, ConfigStore, EnvironmentRegistry, DEFAULT_ENVIRONMENT};
pub use template::PlaceholderRenderer;
