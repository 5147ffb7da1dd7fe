//! `{{ key }}` placeholder renderer

use crate::domain::entities::TemplateVars;
use crate::domain::ports::{RenderError, TemplateRenderer};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Substitutes `{{ key }}` with the matching variable.
///
/// Unknown keys are kept verbatim (the target language may use the same
/// braces for its own purposes) and logged at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template: &str, vars: &TemplateVars) -> Result<String, RenderError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + OPEN.len()..];
            let end = after_open.find(CLOSE).ok_or(RenderError::Unterminated {
                offset: offset + start,
            })?;
            let key = after_open[..end].trim();

            match vars.get(key) {
                Some(value) => out.push_str(value),
                None => {
                    tracing::warn!(key, "unknown template placeholder left as is");
                    out.push_str(&rest[start..start + OPEN.len() + end + CLOSE.len()]);
                }
            }

            let consumed = start + OPEN.len() + end + CLOSE.len();
            offset += consumed;
            rest = &rest[consumed..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> TemplateVars {
        let mut vars = TemplateVars::new();
        vars.insert("name".into(), "work".into());
        vars.insert("shell".into(), "zsh".into());
        vars
    }

    #[test]
    fn substitutes_with_and_without_spaces() {
        let out = PlaceholderRenderer
            .render("env {{name}} uses {{ shell }}", &vars())
            .unwrap();
        assert_eq!(out, "env work uses zsh");
    }

    #[test]
    fn unknown_keys_stay_verbatim() {
        let out = PlaceholderRenderer
            .render("a {{ missing }} b", &vars())
            .unwrap();
        assert_eq!(out, "a {{ missing }} b");
    }

    #[test]
    fn unterminated_placeholder_reports_offset() {
        let err = PlaceholderRenderer
            .render("ok {{name}} then {{oops", &vars())
            .unwrap_err();
        assert_eq!(err, RenderError::Unterminated { offset: 17 });
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let text = "{ pkgs, ... }: { }";
        assert_eq!(PlaceholderRenderer.render(text, &vars()).unwrap(), text);
    }
}
