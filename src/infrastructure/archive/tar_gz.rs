//! In-process `.tar.gz` archiver
//!
//! Entries are added in file-name order with symlinks stored as symlinks,
//! so archiving a state directory and extracting it elsewhere reproduces
//! the `current` pointer exactly.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use walkdir::WalkDir;

use crate::domain::ports::{ArchiveError, Archiver};

#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzArchiver;

impl TarGzArchiver {
    pub fn new() -> Self {
        Self
    }
}

impl Archiver for TarGzArchiver {
    fn create(&self, source: &Path, archive: &Path, exclude: &[PathBuf]) -> Result<(), ArchiveError> {
        if !source.is_dir() {
            return Err(ArchiveError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }
        let write_err = |message: String| ArchiveError::Write {
            path: archive.to_path_buf(),
            message,
        };

        let file = File::create(archive).map_err(|e| write_err(e.to_string()))?;
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);

        let mut count = 0usize;
        for entry in WalkDir::new(source)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry
                    .path()
                    .strip_prefix(source)
                    .map(|rel| !exclude.iter().any(|ex| rel == ex.as_path()))
                    .unwrap_or(true)
            })
        {
            let entry = entry.map_err(|e| write_err(e.to_string()))?;
            let rel = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| write_err(e.to_string()))?;
            builder
                .append_path_with_name(entry.path(), rel)
                .map_err(|e| write_err(format!("{}: {e}", rel.display())))?;
            count += 1;
        }

        let encoder = builder.into_inner().map_err(|e| write_err(e.to_string()))?;
        let mut writer = encoder.finish().map_err(|e| write_err(e.to_string()))?;
        writer.flush().map_err(|e| write_err(e.to_string()))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| write_err(e.to_string()))?;

        tracing::debug!(archive = %archive.display(), entries = count, "created archive");
        Ok(())
    }

    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ArchiveError> {
        let read_err = |message: String| ArchiveError::Read {
            path: archive.to_path_buf(),
            message,
        };

        let file = File::open(archive).map_err(|e| read_err(e.to_string()))?;
        let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
        tar.set_preserve_permissions(true);

        for entry in tar.entries().map_err(|e| read_err(e.to_string()))? {
            let mut entry = entry.map_err(|e| read_err(e.to_string()))?;
            let path = entry
                .path()
                .map_err(|e| read_err(e.to_string()))?
                .into_owned();
            if !is_contained(&path) {
                return Err(ArchiveError::UnsafeEntry { entry: path });
            }
            let unpacked = entry
                .unpack_in(destination)
                .map_err(|e| read_err(format!("{}: {e}", path.display())))?;
            if !unpacked {
                return Err(ArchiveError::UnsafeEntry { entry: path });
            }
        }

        tracing::debug!(archive = %archive.display(), destination = %destination.display(), "extracted archive");
        Ok(())
    }
}

/// Relative path with no `..`, root or prefix components.
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
