//! Error types for nixlayer
//!
//! Library code returns [`NixlayerError`]; the binary wraps it in `anyhow`
//! for top-level context and maps every error to exit code 1.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::services::ConflictReport;

/// Result type alias for nixlayer operations
pub type NixlayerResult<T> = Result<T, NixlayerError>;

/// Main error type for nixlayer operations
#[derive(Error, Debug)]
pub enum NixlayerError {
    /// Malformed or disallowed config field
    #[error("invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    /// Cross-layer mismatch blocking a mutation
    #[error("{report}\n  → Fix: align the layers, or pass --force to let the higher-priority layer win")]
    Conflict { report: ConflictReport },

    /// Missing config, backup or environment
    #[error("{what} not found: {name}")]
    NotFound { what: &'static str, name: String },

    /// Create of something that is already there
    #[error("{what} already exists: {name}")]
    AlreadyExists { what: &'static str, name: String },

    /// Filesystem failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    /// Non-zero exit (or spawn failure) of an external capability
    #[error("{tool} failed{}: {stderr}", .code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    ExternalTool {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A mutation failed and the automatic rollback succeeded
    #[error("{original}\n  state was rolled back to {}", .snapshot.display())]
    RolledBack {
        original: Box<NixlayerError>,
        snapshot: PathBuf,
    },

    /// A mutation failed and the automatic rollback failed too
    #[error("{original}\n  rollback from {} also failed: {rollback}\n  → Fix: restore manually with `nixlayer backup restore {}`", .snapshot.display(), .snapshot.display())]
    Rollback {
        original: Box<NixlayerError>,
        rollback: Box<NixlayerError>,
        snapshot: PathBuf,
    },
}

impl NixlayerError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            name: name.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// True for errors that must never be retried or swallowed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Rollback { .. })
    }
}

/// Attach a human-readable context to `std::io` results.
pub trait IoContext<T> {
    fn io_context<C, F>(self, context: F) -> NixlayerResult<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<C, F>(self, context: F) -> NixlayerResult<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|source| NixlayerError::Io {
            context: context().into(),
            source,
        })
    }
}
