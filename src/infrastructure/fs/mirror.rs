//! Directory mirroring (copy, deleting extraneous entries).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{IoContext, NixlayerError, NixlayerResult};

/// Make `target` an exact copy of `source`.
///
/// Entries in `target` that are missing from `source` (or differ in kind)
/// are removed first, then every directory, file and symlink of `source` is
/// copied over. Files and symlinks are renamed into place, never rewritten
/// in place, so read-only files are replaced too. Paths in `preserve` (relative to both roots) are skipped on
/// both sides, so they survive untouched.
pub fn mirror_dir(source: &Path, target: &Path, preserve: &[PathBuf]) -> NixlayerResult<()> {
    fs::create_dir_all(target).io_context(|| format!("creating {}", target.display()))?;

    for stale in stale_entries(source, target, preserve)? {
        remove_entry(&stale)?;
    }

    for entry in walk(source, preserve) {
        let entry = entry.map_err(|e| walk_error(source, e))?;
        let rel = relative(source, entry.path())?;
        let dest = target.join(rel);
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            let link_target = fs::read_link(entry.path())
                .io_context(|| format!("reading link {}", entry.path().display()))?;
            super::replace_symlink(&link_target, &dest)?;
        } else if file_type.is_dir() {
            fs::create_dir_all(&dest).io_context(|| format!("creating {}", dest.display()))?;
        } else {
            super::copy_atomic(entry.path(), &dest)?;
        }
    }

    tracing::debug!(source = %source.display(), target = %target.display(), "mirrored directory");
    Ok(())
}

/// Entries of `target` with no same-kind counterpart in `source`.
fn stale_entries(source: &Path, target: &Path, preserve: &[PathBuf]) -> NixlayerResult<Vec<PathBuf>> {
    let mut stale = Vec::new();
    let mut walker = walk(target, preserve);
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| walk_error(target, e))?;
        let rel = relative(target, entry.path())?;
        let counterpart = source.join(rel);

        let same_kind = match fs::symlink_metadata(&counterpart) {
            Ok(meta) => {
                let (ours, theirs) = (entry.file_type(), meta.file_type());
                ours.is_symlink() == theirs.is_symlink() && ours.is_dir() == theirs.is_dir()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                return Err(NixlayerError::io(
                    format!("inspecting {}", counterpart.display()),
                    e,
                ))
            }
        };

        if !same_kind {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            stale.push(entry.into_path());
        }
    }
    Ok(stale)
}

fn walk(
    root: &Path,
    preserve: &[PathBuf],
) -> walkdir::FilterEntry<walkdir::IntoIter, impl FnMut(&walkdir::DirEntry) -> bool> {
    let root_buf = root.to_path_buf();
    let preserve: Vec<PathBuf> = preserve.to_vec();
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| {
            entry
                .path()
                .strip_prefix(&root_buf)
                .map(|rel| !preserve.iter().any(|p| rel == p.as_path()))
                .unwrap_or(true)
        })
}

/// Remove a file, symlink or directory tree. Missing entries are fine.
fn remove_entry(path: &Path) -> NixlayerResult<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(NixlayerError::io(format!("inspecting {}", path.display()), e)),
    };
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(NixlayerError::io(format!("removing {}", path.display()), e)),
    }
}

fn relative<'a>(root: &Path, path: &'a Path) -> NixlayerResult<&'a Path> {
    path.strip_prefix(root).map_err(|_| {
        NixlayerError::io(
            format!("{} is outside {}", path.display(), root.display()),
            io::Error::from(io::ErrorKind::InvalidInput),
        )
    })
}

fn walk_error(root: &Path, err: walkdir::Error) -> NixlayerError {
    NixlayerError::io(format!("walking {}", root.display()), err.into())
}
