//! Config document entity
//!
//! The typed form of one configuration layer. Field names on the wire are
//! camelCase (`logLevel`, `autoUpdate`, ...) and must round-trip unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::LayerKind;

/// Fixed `kind` of every config document.
pub const CONFIG_KIND: &str = "EnvironmentConfig";

/// Version written into newly created documents.
pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Missing versions deserialize as empty and fail validation by name.
    #[serde(default)]
    pub version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(rename = "type")]
    pub layer_type: LayerKind,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[serde(default)]
    pub settings: ConfigSettings,

    #[serde(default, skip_serializing_if = "Packages::is_empty")]
    pub packages: Packages,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<Script>,
}

fn default_kind() -> String {
    CONFIG_KIND.to_string()
}

impl Config {
    pub fn new(layer_type: LayerKind, name: impl Into<String>) -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            kind: default_kind(),
            layer_type,
            metadata: Metadata {
                name: name.into(),
                ..Metadata::default()
            },
            base: None,
            settings: ConfigSettings::default(),
            packages: Packages::default(),
            scripts: Vec::new(),
        }
    }

    pub fn with_shell(mut self, shell: &str) -> Self {
        self.settings.shell = Some(ToolChoice::new(shell));
        self
    }

    pub fn with_editor(mut self, editor: &str) -> Self {
        self.settings.editor = Some(ToolChoice::new(editor));
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.settings
            .environment
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_core_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages.core = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn shell_type(&self) -> Option<&str> {
        self.settings.shell.as_ref().map(|s| s.kind.as_str())
    }

    pub fn editor_type(&self) -> Option<&str> {
        self.settings.editor.as_ref().map(|e| e.kind.as_str())
    }

    /// Effective merge priority (explicit `metadata.priority` or the layer default).
    pub fn priority(&self) -> i32 {
        self.metadata
            .priority
            .unwrap_or_else(|| self.layer_type.default_priority())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<ToolChoice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<ToolChoice>,

    /// Environment variables exported into the environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_update: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<String>,
}

/// `{ type: <name> }` entry for shell and editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolChoice {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ToolChoice {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packages {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub core: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional: Vec<String>,

    /// Platform (e.g. `darwin`, `linux`) → packages.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub platform: BTreeMap<String, Vec<String>>,

    /// Team name → packages.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub team: BTreeMap<String, Vec<String>>,
}

impl Packages {
    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
            && self.optional.is_empty()
            && self.additional.is_empty()
            && self.platform.is_empty()
            && self.team.is_empty()
    }

    /// Every package name, in declaration order, for template rendering.
    pub fn flattened(&self, platform: &str) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.core
            .iter()
            .chain(self.optional.iter())
            .chain(self.additional.iter())
            .chain(self.platform.get(platform).into_iter().flatten())
            .chain(self.team.values().flatten())
            .map(String::as_str)
            .filter(|p| seen.insert(*p))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub commands: Vec<String>,
}
