//! Domain Layer
//!
//! Pure business logic without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Config documents, environments, backups
//! - `value_objects/` - Layers, tool kinds, backup identifiers, names
//! - `services/` - Merge, conflict detection, validation
//! - `ports/` - Interface definitions for infrastructure (archive, apply, render)

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
