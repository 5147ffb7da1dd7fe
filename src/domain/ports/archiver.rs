//! Archiver port - create/extract snapshot archives
//!
//! Implementations:
//! - `TarGzArchiver` - in-process gzip-compressed tar
//! - test fakes that fail on demand

use std::path::{Path, PathBuf};

use crate::error::NixlayerError;

/// Snapshot archive capability.
pub trait Archiver {
    /// Archive the tree under `source` into `archive`.
    ///
    /// `exclude` holds paths relative to `source` that are skipped together
    /// with everything below them. Symlinks are stored as symlinks.
    fn create(&self, source: &Path, archive: &Path, exclude: &[PathBuf]) -> Result<(), ArchiveError>;

    /// Extract `archive` into the existing, empty directory `destination`.
    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ArchiveError>;
}

impl<T: Archiver + ?Sized> Archiver for &T {
    fn create(&self, source: &Path, archive: &Path, exclude: &[PathBuf]) -> Result<(), ArchiveError> {
        (**self).create(source, archive, exclude)
    }

    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ArchiveError> {
        (**self).extract(archive, destination)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive source not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("failed to write archive {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("failed to read archive {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("archive entry '{entry}' would escape the extraction directory")]
    UnsafeEntry { entry: PathBuf },
}

impl From<ArchiveError> for NixlayerError {
    fn from(err: ArchiveError) -> Self {
        NixlayerError::ExternalTool {
            tool: "archiver".to_string(),
            code: None,
            stderr: err.to_string(),
        }
    }
}
