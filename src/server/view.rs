//! The form page, with a single `{{ context }}` slot for the result.

use std::fs;
use std::path::Path;

use tracing::warn;

static EMBEDDED_INDEX: &str = include_str!("../../templates/index.html");
static CONTEXT_SLOT: &str = "{{ context }}";

#[derive(Debug, Clone)]
pub struct IndexTemplate {
    source: String,
}

impl IndexTemplate {
    pub fn embedded() -> Self {
        Self {
            source: EMBEDDED_INDEX.to_string(),
        }
    }

    /// Load `index.html` from `dir`, falling back to the copy built into the
    /// binary when the file cannot be read.
    pub fn from_dir(dir: &Path) -> Self {
        let path = dir.join("index.html");
        match fs::read_to_string(&path) {
            Ok(source) => Self { source },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Using built-in index template");
                Self::embedded()
            }
        }
    }

    pub fn render(&self, context: &str) -> String {
        self.source.replace(CONTEXT_SLOT, &escape_html(context))
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_fills_the_slot() {
        let page = IndexTemplate::embedded().render("Rendering");
        assert!(page.contains("Rendering"));
        assert!(!page.contains(CONTEXT_SLOT));
    }

    #[test]
    fn context_is_escaped() {
        let page = IndexTemplate::embedded().render("<script>");
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }
}
