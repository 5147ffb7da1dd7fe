//! Config validation
//!
//! Validation also normalizes: shell and editor aliases are rewritten to
//! their canonical names, so everything downstream compares canonical text.

use crate::domain::entities::{Config, CONFIG_KIND};
use crate::domain::value_objects::{allowed_names, parse_duration, EditorKind, ShellKind};
use crate::error::{NixlayerError, NixlayerResult};

/// Validate `config` and return its normalized form.
pub fn validate(config: &Config) -> NixlayerResult<Config> {
    let mut normalized = config.clone();

    if config.version.trim().is_empty() {
        return Err(NixlayerError::validation("version", "version must not be empty"));
    }

    if config.kind != CONFIG_KIND {
        return Err(NixlayerError::validation(
            "kind",
            format!("expected '{CONFIG_KIND}', found '{}'", config.kind),
        ));
    }

    if let Some(shell) = normalized.settings.shell.as_mut() {
        let kind = ShellKind::parse(&shell.kind).ok_or_else(|| {
            NixlayerError::validation(
                "settings.shell.type",
                format!(
                    "unsupported shell '{}' (allowed: {})",
                    shell.kind,
                    allowed_names(&ShellKind::ALL)
                ),
            )
        })?;
        shell.kind = kind.as_str().to_string();
    }

    if let Some(editor) = normalized.settings.editor.as_mut() {
        let kind = EditorKind::parse(&editor.kind).ok_or_else(|| {
            NixlayerError::validation(
                "settings.editor.type",
                format!(
                    "unsupported editor '{}' (allowed: {})",
                    editor.kind,
                    allowed_names(&EditorKind::ALL)
                ),
            )
        })?;
        editor.kind = kind.as_str().to_string();
    }

    // Empty means unset; the merger skips it.
    if let Some(interval) = config
        .settings
        .update_interval
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
    {
        if parse_duration(interval).is_none() {
            return Err(NixlayerError::validation(
                "settings.updateInterval",
                format!("invalid interval '{interval}' (expected e.g. 30m, 24h, 7d)"),
            ));
        }
    }

    for (idx, script) in config.scripts.iter().enumerate() {
        if script.name.trim().is_empty() {
            return Err(NixlayerError::validation(
                format!("scripts[{idx}].name"),
                "script name must not be empty",
            ));
        }
        if script.commands.is_empty() {
            return Err(NixlayerError::validation(
                format!("scripts[{idx}].commands"),
                format!("script '{}' has no commands", script.name),
            ));
        }
    }

    Ok(normalized)
}
