//! Init Use Case
//!
//! Lays out a fresh state directory: directories, a personal config, the
//! default environment and the `current` pointer. Safe to run repeatedly;
//! anything already present is left alone.

use serde::Serialize;

use crate::domain::entities::{template_vars, Config, EnvironmentTemplate};
use crate::domain::ports::TemplateRenderer;
use crate::domain::value_objects::{Layer, LayerKind};
use crate::error::NixlayerResult;
use crate::infrastructure::{ConfigStore, EnvironmentRegistry};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub root: String,
    pub created_personal: bool,
    pub created_environment: Option<String>,
    pub created_pointer: bool,
}

impl InitReport {
    pub fn changed(&self) -> bool {
        self.created_personal || self.created_environment.is_some() || self.created_pointer
    }
}

pub struct InitUseCase<'a, R: TemplateRenderer> {
    store: &'a ConfigStore,
    registry: &'a EnvironmentRegistry<R>,
    template: &'a EnvironmentTemplate,
}

impl<'a, R: TemplateRenderer> InitUseCase<'a, R> {
    pub fn new(
        store: &'a ConfigStore,
        registry: &'a EnvironmentRegistry<R>,
        template: &'a EnvironmentTemplate,
    ) -> Self {
        Self {
            store,
            registry,
            template,
        }
    }

    pub fn execute(&self) -> NixlayerResult<InitReport> {
        let layout = self.store.layout();
        layout.ensure_dirs()?;

        let mut report = InitReport {
            root: layout.root().display().to_string(),
            ..InitReport::default()
        };

        if !self.store.exists(&Layer::Personal) {
            let mut personal = Config::new(LayerKind::Personal, current_user());
            personal.metadata.description = "Personal defaults".to_string();
            self.store.save(&Layer::Personal, &personal)?;
            report.created_personal = true;
        }

        let default = self.registry.default_environment()?;
        if !self.registry.exists(&default) {
            let effective = self.store.effective()?;
            self.registry
                .create(&default, self.template, &template_vars(&default, &effective))?;
            report.created_environment = Some(default.to_string());
        }

        report.created_pointer = self.registry.ensure_pointer(&default)?;

        if report.changed() {
            tracing::info!(root = %report.root, "initialized state directory");
        } else {
            tracing::debug!(root = %report.root, "state directory already initialized");
        }
        Ok(report)
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "user".to_string())
}
