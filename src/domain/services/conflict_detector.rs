//! Cross-layer conflict detection
//!
//! Conflicts are advisory: they block apply/switch unless forced, but never
//! block merging.

use std::fmt;

use serde::Serialize;

use crate::domain::entities::Config;
use crate::domain::value_objects::{EditorKind, LayerKind, ShellKind};

/// Field-level mismatches between config layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConflictReport {
    conflicts: Vec<String>,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    pub fn push(&mut self, conflict: impl Into<String>) {
        self.conflicts.push(conflict.into());
    }

    pub fn extend(&mut self, other: ConflictReport) {
        self.conflicts.extend(other.conflicts);
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return f.write_str("no conflicts");
        }
        write!(f, "{} conflict(s) between configuration layers:", self.conflicts.len())?;
        for conflict in &self.conflicts {
            write!(f, "\n  - {conflict}")?;
        }
        Ok(())
    }
}

/// Compare shell type, editor type and shared environment variables.
///
/// Names are compared after alias normalization, so `nvim` and `neovim`
/// agree. A field that is unset on either side is never a conflict.
pub fn detect_conflicts(a: &Config, b: &Config) -> ConflictReport {
    let mut report = ConflictReport::new();
    let (a_label, b_label) = (layer_label(a), layer_label(b));

    let shell = |c: &Config| {
        c.shell_type()
            .map(|s| normalize(s, |v| ShellKind::parse(v).map(ShellKind::as_str)))
    };
    if let (Some(sa), Some(sb)) = (shell(a), shell(b)) {
        if sa != sb {
            report.push(format!(
                "shell type mismatch: {a_label}={sa}, {b_label}={sb}"
            ));
        }
    }

    let editor = |c: &Config| {
        c.editor_type()
            .map(|e| normalize(e, |v| EditorKind::parse(v).map(EditorKind::as_str)))
    };
    if let (Some(ea), Some(eb)) = (editor(a), editor(b)) {
        if ea != eb {
            report.push(format!(
                "editor type mismatch: {a_label}={ea}, {b_label}={eb}"
            ));
        }
    }

    for (key, va) in &a.settings.environment {
        if let Some(vb) = b.settings.environment.get(key) {
            if va != vb {
                report.push(format!(
                    "environment variable {key} mismatch: {a_label}={va}, {b_label}={vb}"
                ));
            }
        }
    }

    report
}

fn normalize(value: &str, canonical: impl Fn(&str) -> Option<&'static str>) -> String {
    canonical(value)
        .map(str::to_string)
        .unwrap_or_else(|| value.trim().to_lowercase())
}

fn layer_label(config: &Config) -> String {
    match config.layer_type {
        LayerKind::Team if !config.metadata.name.is_empty() => {
            format!("team:{}", config.metadata.name)
        }
        kind => kind.to_string(),
    }
}
