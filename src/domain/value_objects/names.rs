//! Validated names used as path components.

use std::fmt;

use crate::error::{NixlayerError, NixlayerResult};

/// Name of an environment directory.
///
/// ASCII alphanumerics plus `-`, `_` and `.`, never starting with `.` so it
/// can't collide with staging directories or escape the environments dir.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnvironmentName(String);

impl EnvironmentName {
    pub fn parse(value: &str) -> NixlayerResult<Self> {
        check_component("name", "environment name", value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check a team name used in a `base:` reference. Same rules as
/// [`EnvironmentName`] since it becomes `teams/<name>.yaml`.
pub fn validate_team_name(name: &str) -> NixlayerResult<()> {
    check_component("base", "team name", name)
}

fn check_component(field: &str, what: &str, value: &str) -> NixlayerResult<()> {
    if value.is_empty() {
        return Err(NixlayerError::validation(field, format!("{what} is empty")));
    }
    if value.starts_with('.') {
        return Err(NixlayerError::validation(
            field,
            format!("{what} '{value}' must not start with '.'"),
        ));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(NixlayerError::validation(
            field,
            format!("{what} '{value}' contains '{bad}'"),
        ));
    }
    Ok(())
}

/// Check a backup label: ASCII alphanumerics plus `-` and `_`.
pub fn validate_label(label: &str) -> NixlayerResult<()> {
    if label.is_empty()
        || !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(NixlayerError::validation(
            "label",
            format!("backup label '{label}' may only contain letters, digits, '-' and '_'"),
        ));
    }
    Ok(())
}
