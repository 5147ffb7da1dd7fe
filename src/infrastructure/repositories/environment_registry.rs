//! Environment registry
//!
//! Named environment directories under `environments/` plus the `current`
//! symlink that addresses one of them. The registry only provides the
//! mechanical steps; sequencing them with backups is the coordinator's job.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::entities::{
    Environment, EnvironmentTemplate, TemplateVars, CUSTOM_FILE, HOME_MANIFEST, PRIMARY_MANIFEST,
    REQUIRED_ARTIFACTS,
};
use crate::domain::ports::TemplateRenderer;
use crate::domain::value_objects::EnvironmentName;
use crate::error::{IoContext, NixlayerError, NixlayerResult};
use crate::infrastructure::fs::{create_symlink, read_link_target, replace_symlink, write_atomic};
use crate::infrastructure::layout::StateLayout;

/// Name of the environment used when no pointer exists.
pub const DEFAULT_ENVIRONMENT: &str = "default";

pub struct EnvironmentRegistry<R> {
    layout: StateLayout,
    renderer: R,
    default_environment: String,
}

impl<R: TemplateRenderer> EnvironmentRegistry<R> {
    pub fn new(layout: StateLayout, renderer: R) -> Self {
        Self {
            layout,
            renderer,
            default_environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }

    pub fn with_default_environment(mut self, name: impl Into<String>) -> Self {
        self.default_environment = name.into();
        self
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    pub fn default_environment(&self) -> NixlayerResult<EnvironmentName> {
        EnvironmentName::parse(&self.default_environment)
    }

    pub fn exists(&self, name: &EnvironmentName) -> bool {
        self.layout.environment_dir(name).is_dir()
    }

    /// Render `template` with `vars` into a new environment directory.
    ///
    /// Files are written into a hidden staging directory beside the target
    /// and the directory is renamed into place once complete.
    pub fn create(
        &self,
        name: &EnvironmentName,
        template: &EnvironmentTemplate,
        vars: &TemplateVars,
    ) -> NixlayerResult<Environment> {
        let target = self.layout.environment_dir(name);
        if target.exists() {
            return Err(NixlayerError::AlreadyExists {
                what: "environment",
                name: name.to_string(),
            });
        }

        let rendered = self.render_all(template, vars)?;

        let parent = self.layout.environments_dir();
        fs::create_dir_all(&parent).io_context(|| format!("creating {}", parent.display()))?;
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&parent)
            .io_context(|| format!("creating staging directory in {}", parent.display()))?;

        for (file, content) in &rendered {
            let path = staging.path().join(file);
            fs::write(&path, content).io_context(|| format!("writing {}", path.display()))?;
        }
        fs::rename(staging.path(), &target)
            .io_context(|| format!("moving environment into {}", target.display()))?;

        tracing::info!(environment = %name, path = %target.display(), "created environment");
        Ok(Environment {
            name: name.clone(),
            is_current: self.current_name()?.as_ref() == Some(name),
            path: target,
        })
    }

    /// Re-render the generated manifests of an existing environment.
    ///
    /// The custom file is user-owned: it is only written when missing.
    pub fn regenerate(
        &self,
        name: &EnvironmentName,
        template: &EnvironmentTemplate,
        vars: &TemplateVars,
    ) -> NixlayerResult<()> {
        let dir = self.get(name)?.path;
        for (file, content) in self.render_all(template, vars)? {
            let path = dir.join(file);
            if file == CUSTOM_FILE && path.exists() {
                continue;
            }
            write_atomic(&path, content.as_bytes())?;
        }
        tracing::debug!(environment = %name, "regenerated manifests");
        Ok(())
    }

    fn render_all(
        &self,
        template: &EnvironmentTemplate,
        vars: &TemplateVars,
    ) -> NixlayerResult<Vec<(&'static str, String)>> {
        let mut rendered = vec![
            (PRIMARY_MANIFEST, self.renderer.render(&template.primary, vars)?),
            (HOME_MANIFEST, self.renderer.render(&template.home, vars)?),
        ];
        if let Some(custom) = &template.custom {
            rendered.push((CUSTOM_FILE, self.renderer.render(custom, vars)?));
        }
        Ok(rendered)
    }

    /// Every environment, sorted by name. Staging directories are skipped.
    pub fn list(&self) -> NixlayerResult<Vec<Environment>> {
        let dir = self.layout.environments_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NixlayerError::io(format!("listing {}", dir.display()), e)),
        };

        let current = self.current_name()?;
        let mut environments = Vec::new();
        for entry in entries {
            let entry = entry.io_context(|| format!("listing {}", dir.display()))?;
            let is_dir = entry
                .file_type()
                .io_context(|| format!("inspecting {}", entry.path().display()))?
                .is_dir();
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !is_dir || file_name.starts_with('.') {
                continue;
            }
            if let Ok(name) = EnvironmentName::parse(&file_name) {
                environments.push(Environment {
                    is_current: current.as_ref() == Some(&name),
                    path: entry.path(),
                    name,
                });
            }
        }
        environments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(environments)
    }

    pub fn get(&self, name: &EnvironmentName) -> NixlayerResult<Environment> {
        if !self.exists(name) {
            return Err(NixlayerError::not_found("environment", name.to_string()));
        }
        Ok(Environment {
            name: name.clone(),
            path: self.layout.environment_dir(name),
            is_current: self.current_name()?.as_ref() == Some(name),
        })
    }

    /// Environment named by the `current` pointer, if there is one.
    pub fn current_name(&self) -> NixlayerResult<Option<EnvironmentName>> {
        let Some(target) = read_link_target(&self.layout.current_link())? else {
            return Ok(None);
        };
        Ok(target
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| EnvironmentName::parse(n).ok()))
    }

    /// Absolute path of the current environment.
    ///
    /// Without a pointer, the default environment is used if it exists.
    pub fn resolve_current(&self) -> NixlayerResult<PathBuf> {
        let link = self.layout.current_link();
        let dir = match read_link_target(&link)? {
            Some(target) => {
                let dir = if target.is_absolute() {
                    target
                } else {
                    self.layout.root().join(target)
                };
                if !dir.is_dir() {
                    return Err(NixlayerError::not_found(
                        "environment",
                        format!("{} (target of {})", dir.display(), link.display()),
                    ));
                }
                dir
            }
            None => {
                let fallback = self.default_environment()?;
                tracing::debug!(environment = %fallback, "no current pointer; using default environment");
                self.get(&fallback)?.path
            }
        };
        dir.canonicalize()
            .io_context(|| format!("resolving {}", dir.display()))
    }

    /// Atomically point `current` at `name`.
    pub fn repoint(&self, name: &EnvironmentName) -> NixlayerResult<()> {
        if !self.exists(name) {
            return Err(NixlayerError::not_found("environment", name.to_string()));
        }
        replace_symlink(
            &self.layout.relative_environment_target(name),
            &self.layout.current_link(),
        )
    }

    /// Create the pointer to `name` unless a pointer already exists.
    ///
    /// Returns whether a pointer was created.
    pub fn ensure_pointer(&self, name: &EnvironmentName) -> NixlayerResult<bool> {
        if read_link_target(&self.layout.current_link())?.is_some() {
            return Ok(false);
        }
        if !self.exists(name) {
            return Err(NixlayerError::not_found("environment", name.to_string()));
        }
        create_symlink(
            &self.layout.relative_environment_target(name),
            &self.layout.current_link(),
        )?;
        Ok(true)
    }

    /// Check that `current` resolves to `name` and that its required
    /// artifacts exist.
    pub fn verify(&self, name: &EnvironmentName) -> NixlayerResult<()> {
        let resolved = self.resolve_current()?;
        let expected = self.layout.environment_dir(name);
        let expected = expected
            .canonicalize()
            .io_context(|| format!("resolving {}", expected.display()))?;
        if resolved != expected {
            return Err(NixlayerError::validation(
                "current",
                format!(
                    "pointer resolves to {}, expected {}",
                    resolved.display(),
                    expected.display()
                ),
            ));
        }
        check_artifacts(&resolved, name)
    }
}

fn check_artifacts(dir: &Path, name: &EnvironmentName) -> NixlayerResult<()> {
    for artifact in REQUIRED_ARTIFACTS {
        if !dir.join(artifact).is_file() {
            return Err(NixlayerError::not_found(
                "artifact",
                format!("{name}/{artifact}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::template::PlaceholderRenderer;
    use tempfile::{tempdir, TempDir};

    fn registry() -> (TempDir, EnvironmentRegistry<PlaceholderRenderer>) {
        let dir = tempdir().unwrap();
        let layout = StateLayout::new(dir.path());
        layout.ensure_dirs().unwrap();
        (dir, EnvironmentRegistry::new(layout, PlaceholderRenderer))
    }

    fn name(value: &str) -> EnvironmentName {
        EnvironmentName::parse(value).unwrap()
    }

    fn vars(env: &str) -> TemplateVars {
        let mut vars = TemplateVars::new();
        vars.insert("name".into(), env.into());
        vars
    }

    fn template() -> EnvironmentTemplate {
        EnvironmentTemplate {
            primary: "flake for {{name}}".into(),
            home: "home for {{ name }}".into(),
            custom: None,
        }
    }

    #[test]
    fn create_renders_manifests() {
        let (_dir, registry) = registry();
        let env = registry.create(&name("work"), &template(), &vars("work")).unwrap();

        assert_eq!(
            fs::read_to_string(env.path.join("flake.nix")).unwrap(),
            "flake for work"
        );
        assert_eq!(
            fs::read_to_string(env.path.join("home.nix")).unwrap(),
            "home for work"
        );
        assert!(!env.path.join("custom.nix").exists());
        assert!(!env.is_current);
    }

    #[test]
    fn create_twice_is_already_exists() {
        let (_dir, registry) = registry();
        registry.create(&name("work"), &template(), &vars("work")).unwrap();
        let err = registry
            .create(&name("work"), &template(), &vars("work"))
            .unwrap_err();
        assert!(matches!(err, NixlayerError::AlreadyExists { what: "environment", .. }));
    }

    #[test]
    fn failed_render_leaves_nothing_behind() {
        let (_dir, registry) = registry();
        let broken = EnvironmentTemplate {
            primary: "{{name".into(),
            ..template()
        };
        assert!(registry.create(&name("work"), &broken, &vars("work")).is_err());
        assert!(registry.list().unwrap().is_empty());
        assert_eq!(
            fs::read_dir(registry.layout().environments_dir())
                .unwrap()
                .count(),
            0
        );
    }

    #[test]
    fn list_is_sorted_and_skips_hidden_entries() {
        let (_dir, registry) = registry();
        for env in ["work", "alpha"] {
            registry.create(&name(env), &template(), &vars(env)).unwrap();
        }
        fs::create_dir(registry.layout().environments_dir().join(".staging-x")).unwrap();
        fs::write(registry.layout().environments_dir().join("stray.txt"), "").unwrap();

        let names: Vec<String> = registry
            .list()
            .unwrap()
            .into_iter()
            .map(|e| e.name.to_string())
            .collect();
        assert_eq!(names, ["alpha", "work"]);
    }

    #[cfg(unix)]
    #[test]
    fn repoint_and_verify() {
        let (_dir, registry) = registry();
        registry.create(&name("work"), &template(), &vars("work")).unwrap();

        registry.repoint(&name("work")).unwrap();

        assert_eq!(registry.current_name().unwrap(), Some(name("work")));
        assert_eq!(
            fs::read_link(registry.layout().current_link()).unwrap(),
            PathBuf::from("environments/work")
        );
        registry.verify(&name("work")).unwrap();
        assert!(registry.get(&name("work")).unwrap().is_current);
    }

    #[test]
    fn repoint_to_unknown_environment_is_not_found() {
        let (_dir, registry) = registry();
        let err = registry.repoint(&name("ghost")).unwrap_err();
        assert!(matches!(err, NixlayerError::NotFound { what: "environment", .. }));
        assert_eq!(registry.current_name().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn verify_reports_missing_artifacts() {
        let (_dir, registry) = registry();
        let env = registry.create(&name("work"), &template(), &vars("work")).unwrap();
        registry.repoint(&name("work")).unwrap();
        fs::remove_file(env.path.join("home.nix")).unwrap();

        let err = registry.verify(&name("work")).unwrap_err();
        assert!(matches!(err, NixlayerError::NotFound { what: "artifact", .. }));
    }

    #[test]
    fn resolve_current_falls_back_to_default() {
        let (_dir, registry) = registry();
        assert!(registry.resolve_current().is_err());

        registry.create(&name("default"), &template(), &vars("default")).unwrap();
        let resolved = registry.resolve_current().unwrap();
        assert!(resolved.ends_with("environments/default"));
    }

    #[cfg(unix)]
    #[test]
    fn ensure_pointer_only_creates_once() {
        let (_dir, registry) = registry();
        registry.create(&name("default"), &template(), &vars("default")).unwrap();
        registry.create(&name("work"), &template(), &vars("work")).unwrap();

        assert!(registry.ensure_pointer(&name("default")).unwrap());
        assert!(!registry.ensure_pointer(&name("work")).unwrap());
        assert_eq!(registry.current_name().unwrap(), Some(name("default")));
    }

    #[test]
    fn regenerate_keeps_custom_file() {
        let (_dir, registry) = registry();
        let with_custom = EnvironmentTemplate {
            custom: Some("custom {{name}}".into()),
            ..template()
        };
        let env = registry.create(&name("work"), &with_custom, &vars("work")).unwrap();
        fs::write(env.path.join("custom.nix"), "mine").unwrap();

        registry
            .regenerate(&name("work"), &with_custom, &vars("renamed"))
            .unwrap();

        assert_eq!(
            fs::read_to_string(env.path.join("flake.nix")).unwrap(),
            "flake for renamed"
        );
        assert_eq!(fs::read_to_string(env.path.join("custom.nix")).unwrap(), "mine");
    }
}
