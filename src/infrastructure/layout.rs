//! State directory layout
//!
//! ```text
//! <root>/
//!   personal.yaml
//!   project.yaml
//!   teams/<team>.yaml
//!   environments/<name>/{flake.nix, home.nix, custom.nix}
//!   current -> environments/<name>
//!   backups/<label->YYYYMMDD-HHMMSS.tar.gz
//!   packages.txt
//!   logs/
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::{EnvironmentName, Layer};
use crate::error::{IoContext, NixlayerResult};

pub const PERSONAL_FILE: &str = "personal.yaml";
pub const PROJECT_FILE: &str = "project.yaml";
pub const TEAMS_DIR: &str = "teams";
pub const ENVIRONMENTS_DIR: &str = "environments";
pub const CURRENT_LINK: &str = "current";
pub const BACKUPS_DIR: &str = "backups";
pub const PACKAGES_FILE: &str = "packages.txt";
pub const LOGS_DIR: &str = "logs";

/// Extension of config documents.
pub const CONFIG_EXTENSION: &str = "yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layer_path(&self, layer: &Layer) -> PathBuf {
        match layer {
            Layer::Personal => self.root.join(PERSONAL_FILE),
            Layer::Project => self.root.join(PROJECT_FILE),
            Layer::Team(name) => self
                .teams_dir()
                .join(format!("{name}.{CONFIG_EXTENSION}")),
        }
    }

    pub fn teams_dir(&self) -> PathBuf {
        self.root.join(TEAMS_DIR)
    }

    pub fn environments_dir(&self) -> PathBuf {
        self.root.join(ENVIRONMENTS_DIR)
    }

    pub fn environment_dir(&self, name: &EnvironmentName) -> PathBuf {
        self.environments_dir().join(name.as_str())
    }

    /// Pointer target as stored in the link (relative to the root).
    pub fn relative_environment_target(&self, name: &EnvironmentName) -> PathBuf {
        Path::new(ENVIRONMENTS_DIR).join(name.as_str())
    }

    pub fn current_link(&self) -> PathBuf {
        self.root.join(CURRENT_LINK)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    pub fn packages_file(&self) -> PathBuf {
        self.root.join(PACKAGES_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    /// Paths (relative to the root) that snapshots skip and restores keep.
    pub fn snapshot_excludes(&self) -> Vec<PathBuf> {
        vec![PathBuf::from(BACKUPS_DIR), PathBuf::from(LOGS_DIR)]
    }

    /// Create every directory of the layout.
    pub fn ensure_dirs(&self) -> NixlayerResult<()> {
        for dir in [
            self.root.clone(),
            self.teams_dir(),
            self.environments_dir(),
            self.backups_dir(),
            self.logs_dir(),
        ] {
            fs::create_dir_all(&dir).io_context(|| format!("creating {}", dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn layer_paths() {
        let layout = StateLayout::new("/state");
        assert_eq!(
            layout.layer_path(&Layer::Personal),
            PathBuf::from("/state/personal.yaml")
        );
        assert_eq!(
            layout.layer_path(&Layer::Team("infra".into())),
            PathBuf::from("/state/teams/infra.yaml")
        );
    }

    #[test]
    fn environment_paths() {
        let layout = StateLayout::new("/state");
        let name = EnvironmentName::parse("work").unwrap();
        assert_eq!(
            layout.environment_dir(&name),
            PathBuf::from("/state/environments/work")
        );
        assert_eq!(
            layout.relative_environment_target(&name),
            PathBuf::from("environments/work")
        );
    }

    #[test]
    fn ensure_dirs_is_idempotent() {
        let dir = tempdir().unwrap();
        let layout = StateLayout::new(dir.path().join("state"));
        layout.ensure_dirs().unwrap();
        layout.ensure_dirs().unwrap();
        assert!(layout.backups_dir().is_dir());
        assert!(layout.environments_dir().is_dir());
        assert!(layout.logs_dir().is_dir());
    }
}
