//! Switch Coordinator
//!
//! Runs every state-changing operation inside one envelope:
//! 1. Check cross-layer conflicts (skipped with `force`)
//! 2. Take a safety snapshot; abort if that fails
//! 3. Run the mutation
//! 4. On failure, restore the snapshot and report both outcomes
//! 5. On success, keep the snapshot for manual rollback

use std::path::Path;

use chrono::{Local, NaiveDateTime};

use crate::domain::entities::{
    host_platform, template_vars, Backup, Config, Environment, EnvironmentTemplate,
};
use crate::domain::ports::{Archiver, ConfigApplier, TemplateRenderer};
use crate::domain::services::{self, ConflictReport};
use crate::domain::value_objects::{EnvironmentName, Layer, LayerKind, RollbackSelector};
use crate::error::{NixlayerError, NixlayerResult};
use crate::infrastructure::{BackupManager, ConfigStore, EnvironmentRegistry, StateLayout};

use super::report::{ApplyReport, ImportReport, RollbackReport, SwitchReport};
use super::state::{SwitchState, Transaction};

pub struct SwitchCoordinator<A, P, R>
where
    A: Archiver,
    P: ConfigApplier,
    R: TemplateRenderer,
{
    store: ConfigStore,
    registry: EnvironmentRegistry<R>,
    backups: BackupManager<A>,
    applier: P,
    template: EnvironmentTemplate,
}

impl<A, P, R> SwitchCoordinator<A, P, R>
where
    A: Archiver,
    P: ConfigApplier,
    R: TemplateRenderer,
{
    pub fn new(layout: StateLayout, archiver: A, applier: P, renderer: R) -> Self {
        Self {
            store: ConfigStore::new(layout.clone()),
            registry: EnvironmentRegistry::new(layout.clone(), renderer),
            backups: BackupManager::new(layout, archiver),
            applier,
            template: EnvironmentTemplate::default(),
        }
    }

    pub fn with_default_environment(mut self, name: impl Into<String>) -> Self {
        self.registry = self.registry.with_default_environment(name);
        self
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn registry(&self) -> &EnvironmentRegistry<R> {
        &self.registry
    }

    pub fn backups(&self) -> &BackupManager<A> {
        &self.backups
    }

    pub fn template(&self) -> &EnvironmentTemplate {
        &self.template
    }

    pub fn detect_conflicts(&self) -> NixlayerResult<ConflictReport> {
        self.store.detect_conflicts()
    }

    /// Run `mutation` under the full protocol.
    ///
    /// The closure is entered in the `Switching` state and may advance the
    /// transaction further. Returns its value and the safety snapshot.
    pub fn transaction<T, F>(
        &self,
        label: &str,
        force: bool,
        mutation: F,
    ) -> NixlayerResult<(T, Backup)>
    where
        F: FnOnce(&mut Transaction) -> NixlayerResult<T>,
    {
        self.check_conflicts(force)?;
        self.guarded(label, mutation)
    }

    fn check_conflicts(&self, force: bool) -> NixlayerResult<()> {
        let report = self.store.detect_conflicts()?;
        self.enforce(report, force)
    }

    fn enforce(&self, report: ConflictReport, force: bool) -> NixlayerResult<()> {
        if report.is_empty() {
            return Ok(());
        }
        if force {
            for conflict in report.conflicts() {
                tracing::warn!(conflict = %conflict, "conflict overridden by --force");
            }
            return Ok(());
        }
        Err(NixlayerError::Conflict { report })
    }

    /// Steps 2 to 5 of the envelope.
    fn guarded<T, F>(&self, label: &str, mutation: F) -> NixlayerResult<(T, Backup)>
    where
        F: FnOnce(&mut Transaction) -> NixlayerResult<T>,
    {
        let mut tx = Transaction::new(label);

        tx.enter(SwitchState::BackingUp);
        let snapshot = self.backups.create(Some(label))?;

        tx.enter(SwitchState::Switching);
        match mutation(&mut tx) {
            Ok(value) => {
                tx.enter(SwitchState::Committed);
                tracing::info!(transaction = label, snapshot = %snapshot.path.display(), "committed");
                Ok((value, snapshot))
            }
            Err(original) => {
                tracing::warn!(transaction = label, state = %tx.state(), error = %original, "mutation failed; rolling back");
                match self.backups.restore(&snapshot) {
                    Ok(()) => {
                        tx.enter(SwitchState::RolledBack);
                        tracing::warn!(transaction = label, snapshot = %snapshot.path.display(), "rolled back");
                        Err(NixlayerError::RolledBack {
                            original: Box::new(original),
                            snapshot: snapshot.path,
                        })
                    }
                    Err(rollback) => {
                        tracing::error!(transaction = label, error = %rollback, "rollback failed");
                        Err(NixlayerError::Rollback {
                            original: Box::new(original),
                            rollback: Box::new(rollback),
                            snapshot: snapshot.path,
                        })
                    }
                }
            }
        }
    }

    /// Make `name` the current environment.
    pub fn switch(&self, name: &str, force: bool) -> NixlayerResult<SwitchReport> {
        let name = EnvironmentName::parse(name)?;
        self.check_conflicts(force)?;
        let target = self.registry.get(&name)?;
        let from = self.registry.current_name()?;

        let (_, snapshot) = self.guarded("pre-switch", |tx| {
            self.registry.repoint(&name)?;
            self.activate(&target.path)?;
            tx.enter(SwitchState::Verifying);
            self.registry.verify(&name)
        })?;

        tracing::info!(from = ?from.as_ref().map(ToString::to_string), to = %name, "switched environment");
        Ok(SwitchReport {
            from: from.map(|n| n.to_string()),
            to: name.to_string(),
            snapshot: snapshot.path,
            state: SwitchState::Committed,
        })
    }

    /// Regenerate the current environment from the effective configuration
    /// and activate it.
    pub fn apply(&self, force: bool) -> NixlayerResult<ApplyReport> {
        self.check_conflicts(force)?;
        let effective = self.store.effective()?;
        let name = match self.registry.current_name()? {
            Some(name) => name,
            None => self.registry.default_environment()?,
        };
        let environment = self.registry.get(&name)?;
        let vars = template_vars(&name, &effective);

        let (_, snapshot) = self.guarded("pre-apply", |tx| {
            self.registry.regenerate(&name, &self.template, &vars)?;
            self.activate(&environment.path)?;
            tx.enter(SwitchState::Verifying);
            self.registry.verify(&name)
        })?;

        Ok(ApplyReport {
            environment: name.to_string(),
            snapshot: snapshot.path,
            packages: effective.packages.flattened(host_platform()).len(),
            applier: self.applier.name().to_string(),
        })
    }

    /// Validate the document at `path` and install it as the project layer.
    pub fn import_project(&self, path: &Path, force: bool) -> NixlayerResult<ImportReport> {
        let (config, warnings) = ConfigStore::load_file(path)?;
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        if config.layer_type != LayerKind::Project {
            return Err(NixlayerError::validation(
                "type",
                format!(
                    "{} is a {} config; only project configs can be imported",
                    path.display(),
                    config.layer_type
                ),
            ));
        }

        if let Some(personal) = self.store.try_load(&Layer::Personal)? {
            self.enforce(services::detect_conflicts(&personal, &config), force)?;
        }

        let (saved, snapshot) = self.guarded("pre-import", |_| {
            self.store.save(&Layer::Project, &config)
        })?;

        tracing::info!(source = %path.display(), "imported project config");
        Ok(ImportReport {
            snapshot: snapshot.path,
            config: saved,
        })
    }

    /// Restore the backup named by a timestamp, file name or duration such
    /// as `2h`.
    pub fn rollback(&self, identifier: &str) -> NixlayerResult<RollbackReport> {
        self.rollback_at(identifier, Local::now().naive_local())
    }

    /// [`rollback`](Self::rollback) with an explicit "now" for duration
    /// identifiers.
    pub fn rollback_at(
        &self,
        identifier: &str,
        now: NaiveDateTime,
    ) -> NixlayerResult<RollbackReport> {
        let target = match RollbackSelector::parse(identifier) {
            Ok(selector) => self.backups.resolve(&selector, now)?,
            Err(parse_err) => self.backups.find(identifier).map_err(|_| parse_err)?,
        };
        self.restore_backup(target)
    }

    /// Restore the backup named by an exact timestamp, file name or path.
    pub fn restore(&self, identifier: &str) -> NixlayerResult<RollbackReport> {
        let target = self.backups.find(identifier)?;
        self.restore_backup(target)
    }

    fn restore_backup(&self, target: Backup) -> NixlayerResult<RollbackReport> {
        let (_, snapshot) = self.guarded("pre-rollback", |_| self.backups.restore(&target))?;
        Ok(RollbackReport {
            restored: target,
            snapshot: snapshot.path,
        })
    }

    /// Create an environment rendered from the effective configuration.
    ///
    /// Without any config layer the built-in defaults are used.
    pub fn create_environment(&self, name: &str) -> NixlayerResult<Environment> {
        let name = EnvironmentName::parse(name)?;
        let effective = if self.store.present_layers()?.is_empty() {
            Config::new(LayerKind::Personal, "")
        } else {
            self.store.effective()?
        };
        self.registry
            .create(&name, &self.template, &template_vars(&name, &effective))
    }

    fn activate(&self, environment_dir: &Path) -> NixlayerResult<()> {
        let output = self.applier.apply(environment_dir)?;
        if !output.stdout.trim().is_empty() {
            tracing::debug!(applier = self.applier.name(), stdout = %output.stdout.trim(), "applier output");
        }
        Ok(())
    }
}
