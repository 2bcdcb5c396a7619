//! Converts post bodies from Markdown to HTML.

use crate::highlight::Highlighter;
use crate::htmlrenderer::push_html;
use pulldown_cmark::escape::StrWrite;
use pulldown_cmark::{Options, Parser};
use std::io;

/// Converts markdown to HTML, writing the result into `w`.
///
/// * `markdown` is the body of the source file (frontmatter already removed).
/// * `highlighter` colors fenced code blocks that name a language.
/// * `footnote_prefix` is the prefix to prepend onto footnote links,
///   typically the post's URL.
///
/// Rendering never fails on malformed input; the only errors are those
/// returned by `w` itself.
pub fn to_html<W: StrWrite>(
    w: &mut W,
    markdown: &str,
    highlighter: &Highlighter,
    footnote_prefix: &str,
) -> io::Result<()> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    push_html(w, Parser::new_ext(markdown, options), highlighter, footnote_prefix)
}

#[cfg(test)]
mod test {
    use super::*;

    fn render(markdown: &str) -> String {
        let mut html = String::new();
        to_html(&mut html, markdown, &Highlighter::new(), "/post/").unwrap();
        html
    }

    #[test]
    fn test_fenced_code_is_highlighted() {
        let html = render("```rust\n// note\nlet x = a < b;\n```\n");
        assert!(html.starts_with(r#"<pre><code class="language-rust"><span class="source rust">"#));
        assert!(html.contains(r#"<span class="comment line double-slash rust">"#));
        assert!(html.contains("&lt;"));
        assert!(html.ends_with("</code></pre>\n"));
    }

    #[test]
    fn test_fenced_code_with_unknown_language() {
        let html = render("```nosuchlang\nlet x = a < b;\n```\n");
        assert_eq!(
            "<pre><code class=\"language-nosuchlang\">let x = a &lt; b;\n</code></pre>\n",
            html
        );
    }

    #[test]
    fn test_fenced_code_without_language() {
        let html = render("```\nplain\n```\n");
        assert_eq!("<pre><code>plain\n</code></pre>\n", html);
    }

    #[test]
    fn test_standard_constructs() {
        let html = render(
            "# Title\n\nSome *emphasis* and **strong** with a [link](https://example.com).\n\n- one\n- two\n\n> quoted\n",
        );
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
        assert!(html.contains("<strong>strong</strong>"));
        assert!(html.contains(r#"<a href="https://example.com" title="">link</a>"#));
        assert!(html.contains("<ul>\n<li>one</li>\n<li>two</li>\n</ul>"));
        assert!(html.contains("<blockquote>\n<p>quoted</p>\n</blockquote>"));
    }

    #[test]
    fn test_image_alt_text() {
        let html = render("![A *small* cat](/static/cat.png \"Cat\")\n");
        assert_eq!(
            "<p><img src=\"/static/cat.png\" alt=\"A small cat\" title=\"Cat\" /></p>\n",
            html
        );
    }

    #[test]
    fn test_footnotes_use_prefix() {
        let html = render("Claim.[^1]\n\n[^1]: Source.\n");
        assert!(html.contains(r##"<a href="/post/#1">1</a>"##));
        assert!(html.contains(r#"<div class="footnote-definition" id="1">"#));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let input = "Text with `code`, ~~strike~~ and | a | b |\n|---|---|\n| 1 | 2 |\n";
        assert_eq!(render(input), render(input));
    }

    #[test]
    fn test_malformed_markdown_does_not_fail() {
        let html = render("**unclosed *emphasis [link](\n```\nunterminated fence");
        assert!(!html.is_empty());
    }
}
