//! Template rendering for Launchpad.
//! Wraps MiniJinja behind a small trait so catalogs can be rendered
//! without caring about the engine configuration.
use crate::error::{Error, Result};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use std::fmt::Write;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
///
/// Unknown variables are errors rather than empty strings, trailing newlines
/// are kept and nothing is escaped: the output is source code, not HTML.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a new renderer with the strict environment configuration.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("quoted", quoted);
        Self { env }
    }
}

/// Double-quoted string literal valid in TOML, YAML and Python.
///
/// Unlike `tojson` this leaves `<` and `>` alone, which matters for
/// `Name <email>` author strings.
fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// Renders a template string using MiniJinja.
    ///
    /// # Errors
    /// * `Error::MinijinjaError` if the template does not parse or refers to
    ///   a value missing from `context`
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
        self.env.render_str(template, context).map_err(Error::MinijinjaError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_values() {
        let renderer = MiniJinjaRenderer::new();
        let context = json!({"name": "test", "value": 42});

        assert_eq!(renderer.render("Hello {{ name }}!", &context).unwrap(), "Hello test!");
        assert_eq!(renderer.render("Value: {{ value }}", &context).unwrap(), "Value: 42");
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let renderer = MiniJinjaRenderer::new();
        let result = renderer.render("{{ missing }}", &json!({}));
        assert!(matches!(result, Err(Error::MinijinjaError(_))));
    }

    #[test]
    fn quoted_filter_escapes_quotes_only() {
        let renderer = MiniJinjaRenderer::new();
        let context = json!({"value": "say \"hi\" <a@x.com>"});
        assert_eq!(
            renderer.render("{{ value | quoted }}", &context).unwrap(),
            r#""say \"hi\" <a@x.com>""#
        );
    }

    #[test]
    fn quoted_filter_escapes_control_characters() {
        let renderer = MiniJinjaRenderer::new();
        let context = json!({"value": "a\r\nb\u{7}"});
        assert_eq!(
            renderer.render("{{ value | quoted }}", &context).unwrap(),
            r#""a\u000D\nb\u0007""#
        );
    }

    #[test]
    fn keeps_trailing_newline() {
        let renderer = MiniJinjaRenderer::new();
        assert_eq!(renderer.render("a\n", &json!({})).unwrap(), "a\n");
    }

    #[test]
    fn does_not_escape_markup() {
        let renderer = MiniJinjaRenderer::new();
        let context = json!({"author": "A <a@x.com>"});
        assert_eq!(renderer.render("{{ author }}", &context).unwrap(), "A <a@x.com>");
    }
}
