//! shimmybars: minimal Handlebars-style engine for embedding.
//!
//! Templates are compiled once into an immutable node tree ([`Template`])
//! and rendered any number of times, from any number of threads, against
//! JSON-shaped data (`serde_json::Value`, or anything `Serialize`).
//!
//! Supported subset:
//! - `{{path}}`: HTML-escaped interpolation of a dotted path.
//! - `{{{path}}}`: raw interpolation.
//! - `{{#if path}}...{{else}}...{{/if}}` and `{{#unless path}}...{{/unless}}`.
//! - `{{#each path}}...{{/each}}` with `@index`, `@first` and `@last`.
//! - `{{#with path}}...{{/with}}`.
//!
//! Not supported:
//! - Arbitrary expressions (only dotted paths).
//! - Partials, helpers, template caching.
//!
//! Truthiness: `null`, `false` and `""` are falsy. Everything else is
//! truthy, **including `0`**, empty arrays and empty objects.
//!
//! Lookup never walks up the scope chain: inside `{{#with}}` or
//! `{{#each}}` a path is resolved against the current item only.
//!
//! ```
//! use serde_json::json;
//!
//! let template = shimmybars::compile("{{#each xs}}{{#unless @first}}, {{/unless}}{{this}}{{/each}}")?;
//! assert_eq!(template.render(&json!({"xs": ["a", "b"]}))?, "a, b");
//! # Ok::<(), shimmybars::Error>(())
//! ```

pub mod ast;
pub mod error;
pub mod escape;
pub mod eval;
pub mod lexer;
pub mod options;
pub mod parser;
mod template;

pub use ast::{Node, Path};
pub use error::{CompileError, Error, FormatError, NotSupportedError, RenderError, Result};
pub use escape::escape_html;
pub use eval::{Context, IterationMeta};
pub use options::Options;
pub use template::Template;

use serde::Serialize;

/// Compiles `template` with default [`Options`].
pub fn compile(template: &str) -> Result<Template, CompileError> {
    Template::compile(template)
}

/// Compiles and renders in one go.
pub fn render<T: Serialize + ?Sized>(template: &str, data: &T) -> Result<String> {
    Ok(compile(template)?.render_serialize(data)?)
}

/// Compiles `template` and writes its output for `data` into `out`.
pub fn render_to<W, T>(template: &str, out: &mut W, data: &T) -> Result<()>
where
    W: std::fmt::Write,
    T: Serialize + ?Sized,
{
    let template = compile(template)?;
    let value = serde_json::to_value(data).map_err(RenderError::from)?;
    template.render_to(out, &value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_value() {
        assert_eq!(render("{{value}}", &json!({"value": "test"})).unwrap(), "test");
        assert_eq!(render("[{{value}}]", &json!({"value": "test"})).unwrap(), "[test]");
    }

    #[test]
    fn literal_text_is_identity() {
        for template in ["", "abc", "{", "}", "{{", "}}", "{{{", "}}}", "}}}}", "a { b }} c"] {
            assert_eq!(render(template, &json!({"value": "test"})).unwrap(), template);
        }
    }

    #[test]
    fn broken_delimiters_fail() {
        for template in ["{{{{", "{{a", "{{{a"] {
            let err = render(template, &json!({})).unwrap_err();
            assert!(
                matches!(err, Error::Compile(CompileError::Format(_))),
                "{template}: {err:?}"
            );
        }
    }

    #[test]
    fn escaping() {
        let data = json!({"value": "<a>"});
        assert_eq!(render("{{value}}", &data).unwrap(), "&lt;a&gt;");
        assert_eq!(render("{{{value}}}", &data).unwrap(), "<a>");
    }

    #[test]
    fn render_to_appends() {
        let mut out = String::from(">");
        render_to("{{a}}", &mut out, &json!({"a": "b"})).unwrap();
        assert_eq!(out, ">b");
    }
}
