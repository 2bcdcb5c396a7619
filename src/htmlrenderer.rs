//! Implements a custom [`push_html`] for post bodies. It differs from
//! [`pulldown_cmark::html::push_html`] in two ways: footnote references are
//! prefixed with the post's URL so that they still resolve when a post's
//! summary is shown on the index page, and fenced code blocks with a known
//! language are syntax highlighted ([`crate::highlight`]).

use crate::highlight::Highlighter;
use pulldown_cmark::escape::{escape_href, escape_html, StrWrite};
use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, LinkType, Tag};
use std::fmt::{self, Display};
use std::io;

struct Adaptor<'a, T> {
    formatter: &'a mut T,
    result: fmt::Result,
}

impl<T> Adaptor<'_, T> {
    fn handle_result(&mut self, result: fmt::Result) -> io::Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                self.result = result;
                Err(io::Error::new(io::ErrorKind::Other, e))
            }
        }
    }
}

impl<T: fmt::Write> StrWrite for Adaptor<'_, T> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let result = self.formatter.write_str(s);
        self.handle_result(result)
    }

    fn write_fmt(&mut self, args: fmt::Arguments) -> io::Result<()> {
        let result = self.formatter.write_fmt(args);
        self.handle_result(result)
    }
}

struct EscapeHref<'a>(CowStr<'a>);

impl<'a> Display for EscapeHref<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };
        let _ = escape_href(&mut adaptor, &self.0);
        adaptor.result
    }
}

struct EscapeHtml<'a>(CowStr<'a>);

impl<'a> Display for EscapeHtml<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };

        let _ = escape_html(&mut adaptor, &self.0);
        adaptor.result
    }
}

enum TableState {
    Head,
    Body,
}

/// Tracks an image whose alt text is still being collected. Everything
/// between an image's start and end events is flattened into the `alt`
/// attribute; `depth` counts the nested tags inside it.
struct PendingImage<'a> {
    title: CowStr<'a>,
    depth: usize,
}

/// A fenced code block with a language tag whose text is buffered until the
/// block ends so it can be highlighted as a whole.
struct PendingCode {
    language: String,
    text: String,
}

/// Renders markdown [`Event`]s into HTML. This is largely modeled after
/// [`pulldown_cmark`]'s private [`HtmlWriter`
/// struct](https://github.com/raphlinus/pulldown-cmark/blob/bf0a1a4938dbd2ec41c3add069b3d361d11731f4/src/html.rs#L36-L50).
pub struct HtmlRenderer<'a, 'h> {
    table_alignments: Vec<Alignment>,
    table_state: TableState,
    table_cell_index: usize,
    image: Option<PendingImage<'a>>,
    code: Option<PendingCode>,
    highlighter: &'h Highlighter,

    /// The prefix to prepend onto footnote links.
    footnote_prefix: String,
}

impl<'a, 'h> HtmlRenderer<'a, 'h> {
    pub fn new(highlighter: &'h Highlighter, footnote_prefix: &str) -> Self {
        HtmlRenderer {
            table_alignments: Vec::default(),
            table_state: TableState::Head,
            table_cell_index: usize::default(),
            image: None,
            code: None,
            highlighter,
            footnote_prefix: footnote_prefix.to_owned(),
        }
    }

    pub fn on_event<W: StrWrite>(
        &mut self,
        w: &mut W,
        event: Event<'a>,
    ) -> io::Result<()> {
        if self.image.is_some() {
            return self.on_alt_event(w, event);
        }
        if self.code.is_some() {
            return self.on_code_block_event(w, event);
        }
        match event {
            Event::Start(tag) => self.on_start(w, tag),
            Event::End(tag) => self.on_end(w, tag),
            Event::Code(code) => self.on_code(w, code),
            Event::FootnoteReference(name) => write!(
                w,
                r#"<sup class="footnote-reference"><a href="{}#{}">{}</a></sup>"#,
                EscapeHref(CowStr::from(self.footnote_prefix.as_str())),
                EscapeHtml(name.clone()),
                EscapeHtml(name),
            ),
            Event::HardBreak => self.on_hard_break(w),
            Event::Html(html) => self.on_html(w, html),
            Event::Rule => self.on_rule(w),
            Event::SoftBreak => self.on_soft_break(w),
            Event::TaskListMarker(checked) => {
                self.on_task_list_marker(w, checked)
            }
            Event::Text(text) => self.on_text(w, text),
        }
    }

    fn on_alt_event<W: StrWrite>(
        &mut self,
        w: &mut W,
        event: Event<'a>,
    ) -> io::Result<()> {
        match event {
            Event::Start(_) => {
                if let Some(image) = &mut self.image {
                    image.depth += 1;
                }
                Ok(())
            }
            Event::End(_) => match self.image.take() {
                Some(image) if image.depth == 0 => {
                    write!(w, r#"" title="{}" />"#, EscapeHtml(image.title))
                }
                Some(mut image) => {
                    image.depth -= 1;
                    self.image = Some(image);
                    Ok(())
                }
                None => Ok(()),
            },
            Event::Text(text) | Event::Code(text) => escape_html(w, &text),
            Event::SoftBreak | Event::HardBreak => w.write_str(" "),
            _ => Ok(()),
        }
    }

    fn on_code_block_event<W: StrWrite>(
        &mut self,
        w: &mut W,
        event: Event<'a>,
    ) -> io::Result<()> {
        match event {
            Event::End(Tag::CodeBlock(_)) => match self.code.take() {
                Some(code) => self.write_code_block(w, code),
                None => Ok(()),
            },
            Event::Text(text) => {
                if let Some(code) = &mut self.code {
                    code.text.push_str(&text);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn write_code_block<W: StrWrite>(
        &mut self,
        w: &mut W,
        code: PendingCode,
    ) -> io::Result<()> {
        write!(
            w,
            r#"<pre><code class="language-{}">"#,
            EscapeHtml(CowStr::from(code.language.as_str())),
        )?;
        match self.highlighter.highlight(&code.language, &code.text) {
            Some(html) => w.write_str(&html)?,
            None => escape_html(&mut *w, &code.text)?,
        }
        w.write_str("</code></pre>\n")
    }

    fn on_start<W: StrWrite>(
        &mut self,
        w: &mut W,
        tag: Tag<'a>,
    ) -> io::Result<()> {
        match tag {
            Tag::BlockQuote => w.write_str("<blockquote>\n"),
            Tag::CodeBlock(kind) => match kind {
                CodeBlockKind::Fenced(info) => {
                    match info.split_whitespace().next() {
                        // written once the block's text is complete
                        Some(language) => {
                            self.code = Some(PendingCode {
                                language: language.to_owned(),
                                text: String::new(),
                            });
                            Ok(())
                        }
                        None => w.write_str("<pre><code>"),
                    }
                }
                CodeBlockKind::Indented => w.write_str("<pre><code>"),
            },
            Tag::Emphasis => w.write_str("<em>"),
            Tag::FootnoteDefinition(name) => {
                let name = EscapeHtml(name);
                write!(
                    w,
                    r#"<div class="footnote-definition" id="{}">{}. &nbsp;"#,
                    &name, &name,
                )
            }
            Tag::Heading(size) => write!(w, "<h{}>", size),
            Tag::Image(_link_type, dest, title) => {
                self.image = Some(PendingImage { title, depth: 0 });
                write!(w, r#"<img src="{}" alt=""#, EscapeHref(dest))
            }
            Tag::Item => w.write_str("<li>"),
            Tag::Link(LinkType::Email, dest, title) => write!(
                w,
                r#"<a href="mailto:{}" title="{}">"#,
                EscapeHref(dest),
                EscapeHtml(title),
            ),
            Tag::Link(_link_type, dest, title) => write!(
                w,
                r#"<a href="{}" title="{}">"#,
                EscapeHref(dest),
                EscapeHtml(title),
            ),
            Tag::List(None) => w.write_str("<ul>\n"),
            Tag::List(Some(1)) => w.write_str("<ol>\n"),
            Tag::List(Some(start)) => write!(w, "<ol start=\"{}\">\n", start),
            Tag::Paragraph => write!(w, "<p>"),
            Tag::Strikethrough => w.write_str("<del>"),
            Tag::Strong => w.write_str("<strong>"),
            Tag::Table(alignments) => {
                self.table_alignments = alignments;
                w.write_str("<table>")
            }
            Tag::TableHead => {
                self.table_state = TableState::Head;
                self.table_cell_index = 0;
                w.write_str("<thead><tr>")
            }
            Tag::TableRow => {
                self.table_cell_index = 0;
                w.write_str("<tr>")
            }
            Tag::TableCell => write!(
                w,
                "<{}{}>",
                match self.table_state {
                    TableState::Head => "th",
                    TableState::Body => "td",
                },
                match self.table_alignments.get(self.table_cell_index) {
                    Some(Alignment::Left) => r#" align="left""#,
                    Some(Alignment::Right) => r#" align="right""#,
                    Some(Alignment::Center) => r#" align="center""#,
                    _ => "",
                }
            ),
        }
    }

    fn on_end<W: StrWrite>(&mut self, w: &mut W, tag: Tag) -> io::Result<()> {
        match tag {
            Tag::BlockQuote => w.write_str("</blockquote>\n"),
            Tag::CodeBlock(_) => w.write_str("</code></pre>\n"),
            Tag::Emphasis => w.write_str("</em>"),
            Tag::FootnoteDefinition(_) => w.write_str("</div>\n"),
            Tag::Heading(level) => write!(w, "</h{}>\n", level),
            // closed in `on_alt_event`
            Tag::Image(_, _, _) => Ok(()),
            Tag::Item => w.write_str("</li>\n"),
            Tag::Link(_, _, _) => w.write_str("</a>"),
            Tag::List(Some(_)) => w.write_str("</ol>\n"),
            Tag::List(None) => w.write_str("</ul>\n"),
            Tag::Paragraph => w.write_str("</p>\n"),
            Tag::Strikethrough => w.write_str("</del>"),
            Tag::Strong => w.write_str("</strong>"),
            Tag::Table(_) => w.write_str("</tbody></table>\n"),
            Tag::TableHead => {
                self.table_state = TableState::Body;
                w.write_str("</tr></thead><tbody>")
            }
            Tag::TableRow => w.write_str("</tr>"),
            Tag::TableCell => {
                self.table_cell_index += 1;
                w.write_str(match self.table_state {
                    TableState::Head => "</th>",
                    TableState::Body => "</td>",
                })
            }
        }
    }

    fn on_text<W: StrWrite>(
        &mut self,
        w: &mut W,
        s: CowStr,
    ) -> io::Result<()> {
        escape_html(w, &s)
    }

    fn on_code<W: StrWrite>(
        &mut self,
        w: &mut W,
        s: CowStr,
    ) -> io::Result<()> {
        write!(w, "<code>{}</code>", EscapeHtml(s))
    }

    fn on_html<W: StrWrite>(
        &mut self,
        w: &mut W,
        s: CowStr,
    ) -> io::Result<()> {
        w.write_str(&s)
    }

    fn on_soft_break<W: StrWrite>(&mut self, w: &mut W) -> io::Result<()> {
        w.write_str("\n")
    }

    fn on_hard_break<W: StrWrite>(&mut self, w: &mut W) -> io::Result<()> {
        w.write_str("<br />\n")
    }

    fn on_rule<W: StrWrite>(&mut self, w: &mut W) -> io::Result<()> {
        w.write_str("<hr />\n")
    }

    fn on_task_list_marker<W: StrWrite>(
        &mut self,
        w: &mut W,
        checked: bool,
    ) -> io::Result<()> {
        write!(
            w,
            r#"<input disabled="" type="checkbox" {}/>"#,
            match checked {
                true => r#"checked="" "#,
                false => "",
            }
        )
    }
}

/// Converts [`Event`]s into an HTML string much like
/// `pulldown_cmark::html::push_html` except that this also supports footnote
/// prefixes. See the module description for more details.
pub fn push_html<'a, I, W>(
    w: &mut W,
    events: I,
    highlighter: &Highlighter,
    footnote_prefix: &str,
) -> io::Result<()>
where
    I: Iterator<Item = Event<'a>>,
    W: StrWrite,
{
    let mut renderer = HtmlRenderer::new(highlighter, footnote_prefix);
    for event in events {
        renderer.on_event(w, event)?;
    }
    Ok(())
}
