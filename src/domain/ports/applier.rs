//! ConfigApplier port - hand an environment to the real toolchain
//!
//! The core never spawns processes itself; it calls this port with the
//! environment directory and gets back output or a typed error.

use std::path::Path;

use crate::error::NixlayerError;

/// Captured output of a successful external run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

pub trait ConfigApplier {
    /// Short name used in errors and logs.
    fn name(&self) -> &str;

    /// Activate the environment in `environment_dir`. Blocks until done.
    fn apply(&self, environment_dir: &Path) -> Result<ToolOutput, ApplyError>;
}

impl<T: ConfigApplier + ?Sized> ConfigApplier for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, environment_dir: &Path) -> Result<ToolOutput, ApplyError> {
        (**self).apply(environment_dir)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("could not start {tool}: {message}")]
    Spawn { tool: String, message: String },

    #[error("{tool} exited with {code:?}: {stderr}")]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl From<ApplyError> for NixlayerError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::Spawn { tool, message } => NixlayerError::ExternalTool {
                tool,
                code: None,
                stderr: message,
            },
            ApplyError::Failed { tool, code, stderr } => {
                NixlayerError::ExternalTool { tool, code, stderr }
            }
        }
    }
}
