//! TemplateRenderer port
//!
//! Environment manifests are opaque text with `{{ key }}` placeholders; the
//! renderer only substitutes them.

use crate::domain::entities::TemplateVars;
use crate::error::NixlayerError;

pub trait TemplateRenderer {
    fn render(&self, template: &str, vars: &TemplateVars) -> Result<String, RenderError>;
}

impl<T: TemplateRenderer + ?Sized> TemplateRenderer for &T {
    fn render(&self, template: &str, vars: &TemplateVars) -> Result<String, RenderError> {
        (**self).render(template, vars)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unterminated placeholder starting at byte {offset}")]
    Unterminated { offset: usize },
}

impl From<RenderError> for NixlayerError {
    fn from(err: RenderError) -> Self {
        NixlayerError::validation("template", err.to_string())
    }
}
