//! HTML rendering of pulldown-cmark event slices.
//!
//! Blocks are rendered one at a time from the events collected by the
//! document reader. Raw inline HTML (including comments) passes through
//! unchanged so directives hidden in comments can be stripped afterwards.

use std::fmt::Write;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Tag, TagEnd};
use quick_xml::escape::{escape, partial_escape};

/// Renders a sequence of events to an HTML fragment.
#[derive(Debug, Default)]
pub(crate) struct HtmlWriter {
    output: String,
    list_stack: Vec<bool>,
    /// Nesting depth of images; alt text is plain while non-zero.
    image_depth: usize,
    alignments: Vec<Alignment>,
    cell_index: usize,
    in_table_head: bool,
    /// Drop `<p>` wrappers (list item content).
    strip_paragraphs: bool,
    /// Drop task list markers (checkbox state is kept by the reader).
    skip_task_markers: bool,
    paragraph_count: usize,
}

impl HtmlWriter {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Configure the writer for list item content.
    #[must_use]
    pub(crate) fn for_list_item() -> Self {
        Self {
            strip_paragraphs: true,
            skip_task_markers: true,
            ..Self::default()
        }
    }

    /// Render events and return the HTML.
    pub(crate) fn render<'e, 'a: 'e, I>(mut self, events: I) -> String
    where
        I: IntoIterator<Item = &'e Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        self.output
    }

    fn process_event(&mut self, event: &Event<'_>) {
        if self.image_depth > 0 {
            self.alt_text_event(event);
            return;
        }
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(*tag),
            Event::Text(text) => self.text(text),
            Event::Code(code) => {
                let _ = write!(self.output, "<code>{}</code>", partial_escape(code.as_ref()));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(html),
            Event::SoftBreak => {
                self.output.push('\n');
            }
            Event::HardBreak => self.output.push_str("<br />"),
            Event::Rule => self.output.push_str("<hr />"),
            Event::TaskListMarker(checked) => {
                if !self.skip_task_markers {
                    self.output.push_str(if *checked {
                        r#"<input type="checkbox" checked disabled />"#
                    } else {
                        r#"<input type="checkbox" disabled />"#
                    });
                }
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.strip_paragraphs && self.list_stack.is_empty() {
                    if self.paragraph_count > 0 {
                        self.output.push_str("<br />");
                    }
                    self.paragraph_count += 1;
                } else {
                    self.output.push_str("<p>");
                }
            }
            Tag::Heading { level, .. } => {
                let _ = write!(self.output, "<{level}>");
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => match kind {
                CodeBlockKind::Fenced(info) if !info.is_empty() => {
                    let lang = info.split_whitespace().next().unwrap_or_default();
                    let _ = write!(
                        self.output,
                        r#"<pre><code class="language-{}">"#,
                        escape(lang)
                    );
                }
                _ => self.output.push_str("<pre><code>"),
            },
            Tag::List(start) => {
                self.list_stack.push(start.is_some());
                match start {
                    Some(1) => self.output.push_str("<ol>"),
                    Some(n) => {
                        let _ = write!(self.output, r#"<ol start="{n}">"#);
                    }
                    None => self.output.push_str("<ul>"),
                }
            }
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(alignments) => {
                self.alignments.clone_from(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell_index = 0;
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.cell_index = 0;
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let tag = if self.in_table_head { "th" } else { "td" };
                let style = match self.alignments.get(self.cell_index) {
                    Some(Alignment::Left) => r#" style="text-align: left""#,
                    Some(Alignment::Center) => r#" style="text-align: center""#,
                    Some(Alignment::Right) => r#" style="text-align: right""#,
                    _ => "",
                };
                let _ = write!(self.output, "<{tag}{style}>");
            }
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<s>"),
            Tag::Superscript => self.output.push_str("<sup>"),
            Tag::Subscript => self.output.push_str("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let _ = write!(self.output, r#"<a href="{}""#, escape(dest_url.as_ref()));
                if !title.is_empty() {
                    let _ = write!(self.output, r#" title="{}""#, escape(title.as_ref()));
                }
                self.output.push('>');
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text arrives as nested events.
                self.image_depth = 1;
                let _ = write!(self.output, r#"<img src="{}""#, escape(dest_url.as_ref()));
                if !title.is_empty() {
                    let _ = write!(self.output, r#" title="{}""#, escape(title.as_ref()));
                }
                self.output.push_str(r#" alt=""#);
            }
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if !(self.strip_paragraphs && self.list_stack.is_empty()) {
                    self.output.push_str("</p>");
                }
            }
            TagEnd::Heading(level) => {
                let _ = write!(self.output, "</{level}>");
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => self.output.push_str("</code></pre>"),
            TagEnd::List(ordered) => {
                self.list_stack.pop();
                self.output.push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.output.push_str("</tr></thead><tbody>");
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output
                    .push_str(if self.in_table_head { "</th>" } else { "</td>" });
                self.cell_index += 1;
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</s>"),
            TagEnd::Superscript => self.output.push_str("</sup>"),
            TagEnd::Subscript => self.output.push_str("</sub>"),
            TagEnd::Link => self.output.push_str("</a>"),
            TagEnd::Image => self.output.push_str(r#"" />"#),
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        self.output.push_str(&partial_escape(text));
    }

    /// Inside an `alt` attribute only text survives, fully escaped.
    fn alt_text_event(&mut self, event: &Event<'_>) {
        match event {
            Event::Text(text) | Event::Code(text) => self.output.push_str(&escape(text.as_ref())),
            Event::SoftBreak | Event::HardBreak => self.output.push(' '),
            Event::Start(Tag::Image { .. }) => self.image_depth += 1,
            Event::End(TagEnd::Image) => {
                self.image_depth -= 1;
                if self.image_depth == 0 {
                    self.end_tag(TagEnd::Image);
                }
            }
            _ => {}
        }
    }
}

/// Concatenate the plain text carried by events.
///
/// Soft and hard breaks become single spaces; raw HTML is dropped.
pub(crate) fn plain_text<'e, 'a: 'e, I>(events: I) -> String
where
    I: IntoIterator<Item = &'e Event<'a>>,
{
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(TagEnd::Paragraph | TagEnd::Item | TagEnd::CodeBlock) => {
                if !text.ends_with(char::is_whitespace) && !text.is_empty() {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }
    text.trim().to_owned()
}
