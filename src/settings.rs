//! Tool settings
//!
//! Read from `$XDG_CONFIG_HOME/nixlayer/settings.toml`, then overridden by
//! `NIXLAYER_*` environment variables, then by command-line flags.
//!
//! ```toml
//! root = "~/.local/share/nixlayer"
//! default_environment = "default"
//! apply_command = "home-manager switch --flake"
//! apply_enabled = true
//! log_level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::entities::LogLevel;
use crate::domain::value_objects::ConfigWarning;
use crate::error::{IoContext, NixlayerError, NixlayerResult};
use crate::infrastructure::{DEFAULT_APPLY_COMMAND, DEFAULT_ENVIRONMENT};

pub const SETTINGS_FILE: &str = "settings.toml";
pub const APP_DIR: &str = "nixlayer";

const KNOWN_KEYS: &[&str] = &[
    "root",
    "default_environment",
    "apply_command",
    "apply_enabled",
    "log_level",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// State directory; `None` means the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    pub default_environment: String,
    pub apply_command: String,
    pub apply_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: None,
            default_environment: DEFAULT_ENVIRONMENT.to_string(),
            apply_command: DEFAULT_APPLY_COMMAND.to_string(),
            apply_enabled: true,
            log_level: None,
        }
    }
}

impl Settings {
    /// `$XDG_CONFIG_HOME/nixlayer/settings.toml`, falling back to the
    /// platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .or_else(dirs::config_dir)
            .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Load settings from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> NixlayerResult<(Self, Vec<ConfigWarning>)> {
        if !path.is_file() {
            return Ok((Self::default(), Vec::new()));
        }
        let content =
            fs::read_to_string(path).io_context(|| format!("reading {}", path.display()))?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);
        let settings: Settings = serde_ignored::deserialize(deserializer, |p| {
            unknown_paths.push(p.to_string());
        })
        .map_err(|e| NixlayerError::validation(path.display().to_string(), e.to_string()))?;

        let warnings = unknown_paths
            .iter()
            .map(|p| ConfigWarning::unknown_key(p, path.to_path_buf(), &content, KNOWN_KEYS))
            .collect();
        Ok((settings, warnings))
    }

    /// Apply `NIXLAYER_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (an environment-variable reader).
    ///
    /// `NIXLAYER_APPLY` accepts a boolean (`0`/`1`, `true`/`false`,
    /// `on`/`off`, `yes`/`no`) toggling activation; any other value is
    /// taken as the apply command.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(root) = get("NIXLAYER_ROOT") {
            self.root = Some(PathBuf::from(root));
        }
        if let Some(name) = get("NIXLAYER_DEFAULT_ENV") {
            self.default_environment = name;
        }
        if let Some(apply) = get("NIXLAYER_APPLY") {
            match parse_bool(&apply) {
                Some(enabled) => self.apply_enabled = enabled,
                None => {
                    self.apply_command = apply;
                    self.apply_enabled = true;
                }
            }
        }
        if let Some(level) = get("NIXLAYER_LOG_LEVEL") {
            match serde_json::from_value::<LogLevel>(serde_json::Value::String(level.to_lowercase())) {
                Ok(level) => self.log_level = Some(level),
                Err(_) => tracing::warn!(value = %level, "ignoring invalid NIXLAYER_LOG_LEVEL"),
            }
        }
        self
    }

    /// The state directory in effect.
    pub fn state_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(default_root)
    }
}

/// `$XDG_DATA_HOME/nixlayer`, falling back to the platform data directory.
pub fn default_root() -> PathBuf {
    std::env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(dirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
