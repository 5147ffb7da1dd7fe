//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod applier;
pub mod archiver;
pub mod renderer;

pub use applier::{ApplyError, ConfigApplier, ToolOutput};
pub use archiver::{ArchiveError, Archiver};
pub use renderer::{RenderError, TemplateRenderer};
