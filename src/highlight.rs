//! Syntax highlighting for fenced code blocks. Code is tokenized with
//! [`syntect`] and emitted as nested `<span>`s whose classes are the token's
//! scope names (e.g., `<span class="comment line double-slash rust">`), so
//! the theme's stylesheet decides the colors.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Holds the loaded syntax definitions. Loading them is relatively
/// expensive, so one instance is built per run and shared by every post.
pub struct Highlighter {
    syntaxes: SyntaxSet,
}

impl Highlighter {
    pub fn new() -> Highlighter {
        Highlighter {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Returns `code` as highlighted HTML, or `None` if `language` isn't a
    /// known language name or file extension. The result is already
    /// HTML-escaped and is meant to go between `<code>` and `</code>`.
    pub fn highlight(&self, language: &str, code: &str) -> Option<String> {
        let syntax = self.syntaxes.find_syntax_by_token(language)?;
        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntaxes,
            ClassStyle::Spaced,
        );
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                log::warn!("Highlighting `{}` code failed: {}", language, e);
                return None;
            }
        }
        Some(generator.finalize())
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Highlighter::new()
    }
}
