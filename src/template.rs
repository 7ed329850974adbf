//! Page template module
//!
//! Wraps a single precompiled Tera template. A `Template` is built once at
//! startup and only read afterwards, so responders can share it across
//! requests without locking.

use serde::Serialize;
use std::error::Error as _;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;

/// Errors raised while compiling or rendering a page template
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to load template '{}': {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("failed to compile template '{name}': {source}")]
    Compile {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("template path '{}' has no file name", .0.display())]
    InvalidPath(PathBuf),

    #[error("failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: tera::Error,
    },
}

impl TemplateError {
    /// Full error chain on one line, innermost cause last
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        // The outermost source is already part of the Display output above
        if let Some(first) = source {
            source = first.source();
        }
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

/// A compiled, immutable page template
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    engine: Tera,
}

impl Template {
    /// Compile the template file at `path`. The template is named after the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TemplateError::InvalidPath(path.to_path_buf()))?
            .to_string();

        let mut engine = new_engine();
        engine
            .add_template_file(path, Some(&name))
            .map_err(|source| TemplateError::Load {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self { name, engine })
    }

    /// Compile a template from source held in memory
    pub fn from_source(name: &str, source: &str) -> Result<Self, TemplateError> {
        let mut engine = new_engine();
        engine
            .add_raw_template(name, source)
            .map_err(|source| TemplateError::Compile {
                name: name.to_string(),
                source,
            })?;

        Ok(Self {
            name: name.to_string(),
            engine,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render `data` into `buffer`.
    ///
    /// On failure the buffer may hold a partial page and must be discarded.
    pub fn render_into<T: Serialize>(
        &self,
        data: &T,
        buffer: &mut Vec<u8>,
    ) -> Result<(), TemplateError> {
        let render_error = |source| TemplateError::Render {
            name: self.name.clone(),
            source,
        };

        let context = Context::from_serialize(data).map_err(render_error)?;
        self.engine
            .render_to(&self.name, &context, buffer)
            .map_err(render_error)
    }
}

fn new_engine() -> Tera {
    let mut engine = Tera::default();
    engine.set_escape_fn(escape_html);
    engine
}

/// HTML escaping for `.html`/`.htm`/`.xml` templates.
///
/// Unlike Tera's default this leaves `/` alone, so request paths render as-is.
/// `+` is escaped and NUL becomes U+FFFD.
fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            '+' => escaped.push_str("&#43;"),
            '\0' => escaped.push('\u{FFFD}'),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Page<'a> {
        path: &'a str,
    }

    fn render(template: &Template, path: &str) -> Result<String, TemplateError> {
        let mut buffer = Vec::new();
        template.render_into(&Page { path }, &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }

    #[test]
    fn test_render_from_source() {
        let template = Template::from_source("page.html", "Not Found: {{ path }}").unwrap();
        assert_eq!(template.name(), "page.html");
        assert_eq!(render(&template, "/a/b/").unwrap(), "Not Found: /a/b/");
    }

    #[test]
    fn test_html_escaping_keeps_slashes() {
        let template = Template::from_source("page.html", "{{ path }}").unwrap();
        assert_eq!(
            render(&template, "/x/<b>&'\"").unwrap(),
            "/x/&lt;b&gt;&amp;&#39;&#34;"
        );
    }

    #[test]
    fn test_html_escaping_of_plus_and_nul() {
        let template = Template::from_source("page.html", "Not Found: {{ path }}").unwrap();
        assert_eq!(render(&template, "/a+b").unwrap(), "Not Found: /a&#43;b");
        assert_eq!(render(&template, "/a\0b").unwrap(), "Not Found: /a\u{FFFD}b");
    }

    #[test]
    fn test_plain_text_is_not_escaped() {
        let template = Template::from_source("page.txt", "{{ path }}").unwrap();
        assert_eq!(render(&template, "<b>").unwrap(), "<b>");
    }

    #[test]
    fn test_undefined_variable_fails() {
        let template = Template::from_source("page.html", "{{ missing }}").unwrap();
        let err = render(&template, "/").unwrap_err();
        assert!(matches!(err, TemplateError::Render { .. }));
        assert!(err.chain().contains("page.html"));
    }

    #[test]
    fn test_syntax_error_fails_to_compile() {
        let err = Template::from_source("page.html", "{{ path ").unwrap_err();
        assert!(matches!(err, TemplateError::Compile { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/notfound.html");
        let template = Template::load(path).unwrap();
        assert_eq!(template.name(), "notfound.html");
        assert_eq!(render(&template, "/path").unwrap(), "Not Found: /path");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Template::load("templates/does-not-exist.html").unwrap_err();
        assert!(matches!(err, TemplateError::Load { .. }));
    }
}
