//! YAML config store
//!
//! Loads, validates and saves the layered config documents of a state
//! directory, and folds them into the effective configuration.

use std::fs;
use std::path::Path;

use chrono::{SubsecRound, Utc};

use crate::domain::entities::Config;
use crate::domain::services::{self, ConflictReport};
use crate::domain::value_objects::{validate_team_name, ConfigWarning, Layer};
use crate::error::{IoContext, NixlayerError, NixlayerResult};
use crate::infrastructure::fs::write_atomic;
use crate::infrastructure::layout::{StateLayout, CONFIG_EXTENSION};

/// Every key the config document understands, for "did you mean" hints.
const KNOWN_KEYS: &[&str] = &[
    "version",
    "kind",
    "type",
    "metadata",
    "base",
    "settings",
    "packages",
    "scripts",
    "name",
    "description",
    "created",
    "updated",
    "priority",
    "shell",
    "editor",
    "environment",
    "logLevel",
    "autoUpdate",
    "updateInterval",
    "core",
    "optional",
    "additional",
    "platform",
    "team",
    "commands",
];

pub struct ConfigStore {
    layout: StateLayout,
}

impl ConfigStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    pub fn exists(&self, layer: &Layer) -> bool {
        self.layout.layer_path(layer).is_file()
    }

    /// Load and validate one layer. Unknown keys are logged, not fatal.
    pub fn load(&self, layer: &Layer) -> NixlayerResult<Config> {
        let (config, warnings) = self.load_with_warnings(layer)?;
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        Ok(config)
    }

    pub fn load_with_warnings(&self, layer: &Layer) -> NixlayerResult<(Config, Vec<ConfigWarning>)> {
        check_layer(layer)?;
        let path = self.layout.layer_path(layer);
        if !path.is_file() {
            return Err(NixlayerError::not_found(
                "config",
                format!("{layer} ({})", path.display()),
            ));
        }
        Self::load_file(&path)
    }

    /// Load and validate a config document at an arbitrary path.
    pub fn load_file(path: &Path) -> NixlayerResult<(Config, Vec<ConfigWarning>)> {
        let content =
            fs::read_to_string(path).io_context(|| format!("reading {}", path.display()))?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = serde_yaml_ng::Deserializer::from_str(&content);
        let config: Config = serde_ignored::deserialize(deserializer, |p| {
            unknown_paths.push(p.to_string());
        })
        .map_err(|e| NixlayerError::validation(path.display().to_string(), e.to_string()))?;

        let warnings = unknown_paths
            .iter()
            .map(|p| ConfigWarning::unknown_key(p, path.to_path_buf(), &content, KNOWN_KEYS))
            .collect();

        Ok((services::validate(&config)?, warnings))
    }

    /// Like [`load`](Self::load), but a missing document is `None`.
    pub fn try_load(&self, layer: &Layer) -> NixlayerResult<Option<Config>> {
        if self.exists(layer) {
            self.load(layer).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Validate, normalize, timestamp and atomically write `config`.
    ///
    /// Returns the document as written.
    pub fn save(&self, layer: &Layer, config: &Config) -> NixlayerResult<Config> {
        check_layer(layer)?;
        if config.layer_type != layer.kind() {
            return Err(NixlayerError::validation(
                "type",
                format!(
                    "document of type '{}' cannot be saved as the {layer} layer",
                    config.layer_type
                ),
            ));
        }

        let mut config = services::validate(config)?;
        if let Layer::Team(name) = layer {
            if config.metadata.name.is_empty() {
                config.metadata.name = name.clone();
            }
        }
        let now = Utc::now().trunc_subsecs(0);
        config.metadata.created.get_or_insert(now);
        config.metadata.updated = Some(now);

        let yaml = serde_yaml_ng::to_string(&config)
            .map_err(|e| NixlayerError::validation(layer.to_string(), e.to_string()))?;
        let path = self.layout.layer_path(layer);
        write_atomic(&path, yaml.as_bytes())?;

        tracing::info!(layer = %layer, path = %path.display(), "saved config");
        Ok(config)
    }

    /// Names of the team documents, sorted.
    pub fn team_names(&self) -> NixlayerResult<Vec<String>> {
        let dir = self.layout.teams_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NixlayerError::io(format!("listing {}", dir.display()), e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .io_context(|| format!("listing {}", dir.display()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some(CONFIG_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Every present layer, lowest priority first.
    pub fn present_layers(&self) -> NixlayerResult<Vec<Layer>> {
        let mut layers: Vec<Layer> = self
            .team_names()?
            .into_iter()
            .map(Layer::Team)
            .collect();
        layers.push(Layer::Personal);
        layers.push(Layer::Project);
        Ok(layers.into_iter().filter(|l| self.exists(l)).collect())
    }

    /// Load every present layer, sorted lowest → highest priority.
    pub fn load_layers(&self) -> NixlayerResult<Vec<Config>> {
        let mut configs = self
            .present_layers()?
            .iter()
            .map(|layer| self.load(layer))
            .collect::<NixlayerResult<Vec<_>>>()?;
        services::sort_by_priority(&mut configs);
        Ok(configs)
    }

    /// Load `layer` with its `base` chain merged underneath.
    pub fn load_resolved(&self, layer: &Layer) -> NixlayerResult<Config> {
        let mut visited = vec![layer.clone()];
        let mut chain = vec![self.load(layer)?];

        while let Some(reference) = chain.last().and_then(|c| c.base.clone()) {
            let next = Layer::from_reference(&reference)?;
            if visited.contains(&next) {
                let path: Vec<String> = visited
                    .iter()
                    .chain(std::iter::once(&next))
                    .map(ToString::to_string)
                    .collect();
                return Err(NixlayerError::validation(
                    "base",
                    format!("base chain forms a cycle: {}", path.join(" -> ")),
                ));
            }
            chain.push(self.load(&next)?);
            visited.push(next);
        }

        let mut chain = chain.into_iter().rev();
        let deepest = chain
            .next()
            .ok_or_else(|| NixlayerError::not_found("config", layer.to_string()))?;
        Ok(chain.fold(deepest, |resolved, overlay| services::merge(&resolved, &overlay)))
    }

    /// Merge of every present layer (base chains resolved) plus the custom
    /// package list.
    pub fn effective(&self) -> NixlayerResult<Config> {
        let mut configs = self
            .present_layers()?
            .iter()
            .map(|layer| self.load_resolved(layer))
            .collect::<NixlayerResult<Vec<_>>>()?;
        services::sort_by_priority(&mut configs);

        let mut config = services::merge_all(&configs).ok_or_else(|| {
            NixlayerError::not_found(
                "configuration layer",
                self.layout.root().display().to_string(),
            )
        })?;

        let custom = self.custom_packages()?;
        config.packages.additional = services::ordered_union(&config.packages.additional, &custom);
        Ok(config)
    }

    /// Conflicts of the personal layer against project and team layers.
    ///
    /// Without a personal layer, the project layer is checked against the
    /// teams instead.
    pub fn detect_conflicts(&self) -> NixlayerResult<ConflictReport> {
        let personal = self.try_load(&Layer::Personal)?;
        let project = self.try_load(&Layer::Project)?;
        let teams = self
            .team_names()?
            .into_iter()
            .map(|name| self.load(&Layer::Team(name)))
            .collect::<NixlayerResult<Vec<_>>>()?;

        let mut report = ConflictReport::new();
        match (&personal, &project) {
            (Some(personal), project) => {
                for other in project.iter().chain(teams.iter()) {
                    report.extend(services::detect_conflicts(personal, other));
                }
            }
            (None, Some(project)) => {
                for team in &teams {
                    report.extend(services::detect_conflicts(project, team));
                }
            }
            (None, None) => {}
        }
        Ok(report)
    }

    /// Packages from the flat custom list, in file order.
    pub fn custom_packages(&self) -> NixlayerResult<Vec<String>> {
        let content = read_package_file(&self.layout.packages_file())?.unwrap_or_default();
        Ok(parse_package_list(&content))
    }

    /// Append `package` to the custom list. `false` if it was already there.
    pub fn add_custom_package(&self, package: &str) -> NixlayerResult<bool> {
        validate_package_name(package)?;
        let path = self.layout.packages_file();
        let mut content = read_package_file(&path)?.unwrap_or_default();
        if parse_package_list(&content).iter().any(|p| p == package) {
            return Ok(false);
        }

        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(package);
        content.push('\n');
        write_atomic(&path, content.as_bytes())?;

        tracing::info!(package, "added custom package");
        Ok(true)
    }

    /// Drop `package` from the custom list. `false` if it was not there.
    pub fn remove_custom_package(&self, package: &str) -> NixlayerResult<bool> {
        let path = self.layout.packages_file();
        let Some(content) = read_package_file(&path)? else {
            return Ok(false);
        };

        let kept: Vec<&str> = content.lines().filter(|l| l.trim() != package).collect();
        if kept.len() == content.lines().count() {
            return Ok(false);
        }
        let mut rewritten = kept.join("\n");
        if !rewritten.is_empty() {
            rewritten.push('\n');
        }
        write_atomic(&path, rewritten.as_bytes())?;

        tracing::info!(package, "removed custom package");
        Ok(true)
    }
}

fn check_layer(layer: &Layer) -> NixlayerResult<()> {
    match layer {
        Layer::Team(name) => validate_team_name(name),
        Layer::Personal | Layer::Project => Ok(()),
    }
}

/// `None` when the list does not exist yet; any other read failure is an error.
fn read_package_file(path: &Path) -> NixlayerResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(NixlayerError::io(format!("reading {}", path.display()), e)),
    }
}

fn parse_package_list(content: &str) -> Vec<String> {
    let lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect();
    services::ordered_union(&lines, &[])
}

fn validate_package_name(package: &str) -> NixlayerResult<()> {
    if package.is_empty() || package.starts_with('#') || package.chars().any(char::is_whitespace) {
        return Err(NixlayerError::validation(
            "package",
            format!("'{package}' is not a package name"),
        ));
    }
    Ok(())
}
