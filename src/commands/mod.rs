//! Command handlers
//!
//! Each handler builds what it needs from a [`Context`], calls into the
//! library and prints either human text or one JSON event.

mod backup;
mod config;
mod env;
mod init;

use std::path::{Path, PathBuf};

use anyhow::Result;

use nixlayer::domain::ports::{ApplyError, ConfigApplier, ToolOutput};
use nixlayer::logging::{self, LogOptions};
use nixlayer::settings::Settings;
use nixlayer::{
    CommandApplier, NoopApplier, PlaceholderRenderer, StateLayout, SwitchCoordinator,
    TarGzArchiver,
};

use crate::cli::{Cli, Commands};

pub type Coordinator = SwitchCoordinator<TarGzArchiver, ActiveApplier, PlaceholderRenderer>;

/// Applier picked from the settings at startup.
#[derive(Debug, Clone)]
pub enum ActiveApplier {
    Command(CommandApplier),
    Disabled(NoopApplier),
}

impl ActiveApplier {
    pub fn from_settings(settings: &Settings) -> Self {
        if !settings.apply_enabled {
            return Self::Disabled(NoopApplier);
        }
        match CommandApplier::from_command_line(&settings.apply_command) {
            Some(applier) => Self::Command(applier),
            None => {
                tracing::warn!("apply_command is empty; activation disabled");
                Self::Disabled(NoopApplier)
            }
        }
    }
}

impl ConfigApplier for ActiveApplier {
    fn name(&self) -> &str {
        match self {
            Self::Command(applier) => applier.name(),
            Self::Disabled(applier) => applier.name(),
        }
    }

    fn apply(&self, environment_dir: &Path) -> Result<ToolOutput, ApplyError> {
        match self {
            Self::Command(applier) => applier.apply(environment_dir),
            Self::Disabled(applier) => applier.apply(environment_dir),
        }
    }
}

/// Settings and output mode shared by every handler.
pub struct Context {
    pub settings: Settings,
    pub layout: StateLayout,
    pub json: bool,
}

impl Context {
    /// Resolve settings (file, then environment, then flags) and start logging.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (settings, warnings) = match Settings::default_path() {
            Some(path) => Settings::load(&path)?,
            None => (Settings::default(), Vec::new()),
        };
        let mut settings = settings.with_env_overrides();
        if let Some(root) = &cli.root {
            settings.root = Some(absolute(root)?);
        }

        let layout = StateLayout::new(settings.state_root());
        logging::init(&LogOptions {
            verbosity: cli.verbose,
            level: settings.log_level,
            log_dir: Some(layout.logs_dir()),
        });
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        tracing::debug!(root = %layout.root().display(), "using state directory");

        Ok(Self {
            settings,
            layout,
            json: cli.json,
        })
    }

    pub fn coordinator(&self) -> Coordinator {
        SwitchCoordinator::new(
            self.layout.clone(),
            TarGzArchiver::new(),
            ActiveApplier::from_settings(&self.settings),
            PlaceholderRenderer,
        )
        .with_default_environment(self.settings.default_environment.clone())
    }
}

pub fn run(cli: Cli, ctx: &Context) -> Result<()> {
    match cli.command {
        Commands::Init => init::cmd_init(ctx),
        Commands::Apply { force } => config::cmd_apply(ctx, force),
        Commands::Env(command) => env::run(ctx, command),
        Commands::Backup(command) => backup::run(ctx, command),
        Commands::Conflicts => config::cmd_conflicts(ctx),
        Commands::Import { path, force } => config::cmd_import(ctx, &path, force),
        Commands::Config(command) => config::run_config(ctx, command),
        Commands::Packages(command) => config::run_packages(ctx, command),
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_settings_select_noop() {
        let settings = Settings {
            apply_enabled: false,
            ..Settings::default()
        };
        assert_eq!(ActiveApplier::from_settings(&settings).name(), "noop");
    }

    #[test]
    fn command_settings_select_program() {
        let settings = Settings {
            apply_command: "darwin-rebuild switch --flake".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            ActiveApplier::from_settings(&settings).name(),
            "darwin-rebuild"
        );
    }

    #[test]
    fn blank_command_disables_activation() {
        let settings = Settings {
            apply_command: "  ".to_string(),
            ..Settings::default()
        };
        assert_eq!(ActiveApplier::from_settings(&settings).name(), "noop");
    }
}
