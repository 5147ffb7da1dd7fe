//! Atomic write, copy and symlink replacement.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{IoContext, NixlayerResult};

/// Write `content` to `path` atomically.
///
/// The content goes to a temp file in the same directory, which is then
/// renamed over `path`. Readers see either the old or the new file.
pub fn write_atomic(path: &Path, content: &[u8]) -> NixlayerResult<()> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(dir).io_context(|| format!("creating {}", dir.display()))?;

    let mut temp =
        NamedTempFile::new_in(dir).io_context(|| format!("creating temp file in {}", dir.display()))?;
    temp.write_all(content)
        .io_context(|| format!("writing {}", path.display()))?;
    temp.as_file()
        .sync_all()
        .io_context(|| format!("syncing {}", path.display()))?;
    temp.persist(path)
        .map_err(|e| e.error)
        .io_context(|| format!("renaming into {}", path.display()))?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

/// Copy `source` over `dest` atomically, keeping the source permissions.
///
/// Like [`write_atomic`], the copy is assembled in a temp file beside `dest`
/// and renamed into place, so a read-only `dest` is replaced rather than
/// opened for writing.
pub fn copy_atomic(source: &Path, dest: &Path) -> NixlayerResult<()> {
    let dir = parent_dir(dest);
    let mut input =
        std::fs::File::open(source).io_context(|| format!("opening {}", source.display()))?;
    let permissions = input
        .metadata()
        .io_context(|| format!("inspecting {}", source.display()))?
        .permissions();

    let mut temp =
        NamedTempFile::new_in(dir).io_context(|| format!("creating temp file in {}", dir.display()))?;
    std::io::copy(&mut input, temp.as_file_mut())
        .io_context(|| format!("copying {} to {}", source.display(), dest.display()))?;
    temp.as_file()
        .sync_all()
        .io_context(|| format!("syncing {}", dest.display()))?;
    temp.as_file()
        .set_permissions(permissions)
        .io_context(|| format!("setting permissions on {}", dest.display()))?;
    temp.persist(dest)
        .map_err(|e| e.error)
        .io_context(|| format!("renaming into {}", dest.display()))?;
    Ok(())
}

/// Point the symlink at `link` to `target`, replacing whatever is there.
///
/// On unix a new link is created under a unique temp name beside `link` and
/// renamed over it, so `link` always resolves to either the old or the new
/// target. The temp link is removed if anything fails.
#[cfg(unix)]
pub fn replace_symlink(target: &Path, link: &Path) -> NixlayerResult<()> {
    let dir = parent_dir(link);
    let temp = tempfile::Builder::new()
        .prefix(".link-")
        .make_in(dir, |path| std::os::unix::fs::symlink(target, path))
        .io_context(|| format!("creating temp link in {}", dir.display()))?;
    temp.persist(link)
        .map_err(|e| e.error)
        .io_context(|| format!("renaming link into {}", link.display()))?;

    tracing::debug!(link = %link.display(), target = %target.display(), "repointed symlink");
    Ok(())
}

/// Point the symlink at `link` to `target`, replacing whatever is there.
///
/// Windows cannot rename a directory symlink over another, so the old link
/// is removed first. Between the remove and the create `link` does not
/// exist; a crash in that window leaves no pointer, and
/// `EnvironmentRegistry::resolve_current` falls back to the default
/// environment.
#[cfg(not(unix))]
pub fn replace_symlink(target: &Path, link: &Path) -> NixlayerResult<()> {
    match std::fs::remove_dir(link).or_else(|_| std::fs::remove_file(link)) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(crate::error::NixlayerError::io(format!("removing {}", link.display()), e)),
    }
    create_symlink(target, link)
}

/// Create a new symlink. Fails if `link` exists.
pub fn create_symlink(target: &Path, link: &Path) -> NixlayerResult<()> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);
    #[cfg(windows)]
    let result = std::os::windows::fs::symlink_dir(target, link);

    result.io_context(|| format!("linking {} -> {}", link.display(), target.display()))
}

/// Stored target of the symlink at `link`, or `None` if there is no link.
pub fn read_link_target(link: &Path) -> NixlayerResult<Option<PathBuf>> {
    match std::fs::read_link(link) {
        Ok(target) => Ok(Some(target)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(crate::error::NixlayerError::io(
            format!("reading link {}", link.display()),
            e,
        )),
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
