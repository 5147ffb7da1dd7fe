//! ConfigApplier adapters

use std::path::Path;
use std::process::Command;

use crate::domain::ports::{ApplyError, ConfigApplier, ToolOutput};

/// Default activation command; the environment directory is appended.
pub const DEFAULT_APPLY_COMMAND: &str = "home-manager switch --flake";

/// Runs an external program with the environment directory as last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandApplier {
    program: String,
    args: Vec<String>,
}

impl CommandApplier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line. `None` when it is blank.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl Default for CommandApplier {
    fn default() -> Self {
        Self::new(
            "home-manager",
            vec!["switch".to_string(), "--flake".to_string()],
        )
    }
}

impl ConfigApplier for CommandApplier {
    fn name(&self) -> &str {
        &self.program
    }

    fn apply(&self, environment_dir: &Path) -> Result<ToolOutput, ApplyError> {
        tracing::debug!(program = %self.program, args = ?self.args, dir = %environment_dir.display(), "running applier");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(environment_dir)
            .current_dir(environment_dir)
            .output()
            .map_err(|e| ApplyError::Spawn {
                tool: self.program.clone(),
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(ApplyError::Failed {
                tool: self.program.clone(),
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(ToolOutput { stdout, stderr })
    }
}

/// Applier used when activation is disabled in the settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopApplier;

impl ConfigApplier for NoopApplier {
    fn name(&self) -> &str {
        "noop"
    }

    fn apply(&self, environment_dir: &Path) -> Result<ToolOutput, ApplyError> {
        tracing::debug!(dir = %environment_dir.display(), "apply disabled; skipping activation");
        Ok(ToolOutput::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn command_line_is_split() {
        let applier = CommandApplier::from_command_line("  home-manager switch --flake ").unwrap();
        assert_eq!(applier, CommandApplier::default());
        assert_eq!(CommandApplier::from_command_line("   "), None);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = tempdir().unwrap();
        let applier = CommandApplier::new("nixlayer-definitely-missing-binary", vec![]);
        let err = applier.apply(dir.path()).unwrap_err();
        assert!(matches!(err, ApplyError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_carries_code_and_stderr() {
        let dir = tempdir().unwrap();
        let applier = CommandApplier::new(
            "sh",
            vec!["-c".into(), "echo broken >&2; exit 3".into()],
        );
        let err = applier.apply(dir.path()).unwrap_err();
        assert_eq!(
            err,
            ApplyError::Failed {
                tool: "sh".into(),
                code: Some(3),
                stderr: "broken".into(),
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn success_returns_output() {
        let dir = tempdir().unwrap();
        let applier = CommandApplier::new("sh", vec!["-c".into(), "echo activated".into()]);
        let output = applier.apply(dir.path()).unwrap();
        assert_eq!(output.stdout.trim(), "activated");
    }

    #[test]
    fn noop_always_succeeds() {
        let dir = tempdir().unwrap();
        assert_eq!(NoopApplier.apply(dir.path()).unwrap(), ToolOutput::default());
    }
}
