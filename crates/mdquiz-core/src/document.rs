//! Markdown document reader.
//!
//! Turns markdown source into the ordered sequence of top-level blocks the
//! quiz parser walks. Each block keeps its source range so blocks wrapped in
//! HTML comments can be filtered out before any question logic runs.
//!
//! Comment spans come from the parser's HTML events only. Comment markers that
//! appear inside code spans or fenced blocks are plain text to the parser and
//! never open a span.
//!
//! # Pulldown-cmark event flow
//!
//! Every top-level block is a `Start(tag)` … `End(tag)` pair at depth zero
//! (thematic breaks are the only standalone event). The reader buffers the
//! events of one block and converts them once the closing event arrives:
//!
//! ```text
//! Start(List(None))          <- block starts, range covers the whole list
//!   Start(Item)
//!     TaskListMarker(true)
//!     Text("Paris")
//!   End(Item)
//! End(List(false))           <- block complete
//! ```

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

use crate::html::{HtmlWriter, plain_text};

/// Matches an HTML comment inside raw HTML; an unterminated comment runs to the end.
static COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").expect("invalid comment regex"));

/// Parser options used for quiz documents.
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Content of a top-level block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// ATX or setext heading.
    Heading {
        /// Heading level (1-6).
        level: u8,
        /// Plain heading text.
        text: String,
    },
    /// Prose paragraph.
    Paragraph {
        /// Rendered HTML including the `<p>` wrapper.
        html: String,
        /// Plain text.
        text: String,
    },
    /// Fenced or indented code block.
    CodeBlock {
        /// Rendered `<pre><code>` HTML.
        html: String,
        /// Code as written.
        text: String,
    },
    /// Other description-eligible content (block quotes, tables, raw HTML).
    Rich {
        /// Rendered HTML.
        html: String,
        /// Plain text.
        text: String,
    },
    /// Ordered or unordered list.
    List(ListBlock),
    /// Thematic break.
    Rule,
    /// HTML block that consists of comments only.
    Comment,
}

/// A top-level list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListBlock {
    /// Whether the list uses numeric markers.
    pub ordered: bool,
    /// Items in source order.
    pub items: Vec<ListItem>,
}

/// One item of a top-level list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    /// Inline HTML rendering of the item content.
    pub html: String,
    /// Plain text of the item content.
    pub text: String,
    /// Task list marker state; `None` when the item has no checkbox.
    pub checked: Option<bool>,
}

/// A top-level block with its position in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Block content.
    pub kind: BlockKind,
    /// Byte range in the source.
    pub range: Range<usize>,
    /// 1-based line where the block starts.
    pub line: usize,
    /// 1-based index among all top-level blocks.
    pub index: usize,
}

/// A parsed markdown document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    blocks: Vec<Block>,
    comment_spans: Vec<Range<usize>>,
}

impl Document {
    /// Parse markdown source into top-level blocks.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let lines = LineIndex::new(source);
        let mut reader = BlockReader::default();

        for (event, range) in Parser::new_ext(source, parser_options()).into_offset_iter() {
            if let Some((kind, range)) = reader.push(event, range) {
                if matches!(kind, BlockKind::Comment) {
                    reader.comment_spans.push(range.clone());
                }
                let index = reader.count;
                reader.count += 1;
                reader.blocks.push(Block {
                    kind,
                    line: lines.line_of(range.start),
                    range,
                    index: index + 1,
                });
            }
        }

        let mut comment_spans = reader.comment_spans;
        comment_spans.sort_by_key(|span| span.start);

        Self {
            blocks: reader.blocks,
            comment_spans,
        }
        .with_trimmed_ranges(source)
    }

    /// All top-level blocks, including commented-out ones.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Byte ranges of comment-only HTML blocks and inline HTML comments.
    #[must_use]
    pub fn comment_spans(&self) -> &[Range<usize>] {
        &self.comment_spans
    }

    /// Blocks that are not enclosed in a comment span.
    pub fn visible_blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter().filter(|block| {
            !matches!(block.kind, BlockKind::Comment) && !self.is_commented_out(&block.range)
        })
    }

    fn is_commented_out(&self, range: &Range<usize>) -> bool {
        self.comment_spans
            .iter()
            .any(|span| span.start <= range.start && range.end <= span.end)
    }

    /// Shrink block and comment ranges to their non-whitespace content.
    fn with_trimmed_ranges(mut self, source: &str) -> Self {
        for block in &mut self.blocks {
            block.range = trim_range(source, block.range.clone());
        }
        for span in &mut self.comment_spans {
            *span = trim_range(source, span.clone());
        }
        self
    }
}

fn trim_range(source: &str, range: Range<usize>) -> Range<usize> {
    let Some(slice) = source.get(range.clone()) else {
        return range;
    };
    let start = range.start + (slice.len() - slice.trim_start().len());
    let end = range.end - (slice.len() - slice.trim_end().len());
    if start > end { range } else { start..end }
}

/// Buffers the events of the current top-level block.
#[derive(Default)]
struct BlockReader<'a> {
    blocks: Vec<Block>,
    count: usize,
    events: Vec<Event<'a>>,
    depth: usize,
    start: Option<(Tag<'a>, Range<usize>)>,
    comment_spans: Vec<Range<usize>>,
}

impl<'a> BlockReader<'a> {
    /// Feed one event; returns a block when a top-level block is complete.
    fn push(&mut self, event: Event<'a>, range: Range<usize>) -> Option<(BlockKind, Range<usize>)> {
        match event {
            Event::Start(tag) => {
                if self.depth == 0 {
                    self.start = Some((tag, range));
                    self.events.clear();
                } else {
                    self.events.push(Event::Start(tag));
                }
                self.depth += 1;
                None
            }
            Event::End(end) => {
                self.depth = self.depth.saturating_sub(1);
                if self.depth > 0 {
                    self.events.push(Event::End(end));
                    return None;
                }
                let (tag, range) = self.start.take()?;
                let events = std::mem::take(&mut self.events);
                Some((build_block(&tag, &events), range))
            }
            Event::Rule if self.depth == 0 => Some((BlockKind::Rule, range)),
            Event::InlineHtml(html) => {
                if html.starts_with("<!--") {
                    self.comment_spans.push(range);
                }
                self.events.push(Event::InlineHtml(html));
                None
            }
            other => {
                self.events.push(other);
                None
            }
        }
    }
}

/// Convert the buffered inner events of a block into its kind.
fn build_block<'a>(tag: &Tag<'a>, inner: &[Event<'a>]) -> BlockKind {
    match tag {
        Tag::Heading { level, .. } => BlockKind::Heading {
            level: heading_level_to_num(*level),
            text: plain_text(inner),
        },
        Tag::Paragraph => BlockKind::Paragraph {
            html: wrap(tag, inner),
            text: plain_text(inner),
        },
        Tag::CodeBlock(_) => BlockKind::CodeBlock {
            html: wrap(tag, inner),
            text: inner
                .iter()
                .filter_map(|event| match event {
                    Event::Text(text) => Some(text.as_ref()),
                    _ => None,
                })
                .collect(),
        },
        Tag::List(start) => BlockKind::List(ListBlock {
            ordered: start.is_some(),
            items: split_items(inner),
        }),
        Tag::HtmlBlock => {
            let raw: String = inner
                .iter()
                .filter_map(|event| match event {
                    Event::Html(html) | Event::Text(html) => Some(html.as_ref()),
                    _ => None,
                })
                .collect();
            if COMMENT_PATTERN.replace_all(&raw, "").trim().is_empty() {
                BlockKind::Comment
            } else {
                BlockKind::Rich {
                    html: raw.trim().to_owned(),
                    text: String::new(),
                }
            }
        }
        _ => BlockKind::Rich {
            html: wrap(tag, inner),
            text: plain_text(inner),
        },
    }
}

/// Render a block's inner events together with its own start and end tags.
fn wrap<'a>(tag: &Tag<'a>, inner: &[Event<'a>]) -> String {
    let start = Event::Start(tag.clone());
    let end = Event::End(tag.to_end());
    HtmlWriter::new().render(std::iter::once(&start).chain(inner).chain(std::iter::once(&end)))
}

/// Split the inner events of a list into its top-level items.
fn split_items(inner: &[Event<'_>]) -> Vec<ListItem> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut item_start = 0;

    for (i, event) in inner.iter().enumerate() {
        match event {
            Event::Start(Tag::Item) if depth == 0 => {
                item_start = i + 1;
                depth += 1;
            }
            Event::End(TagEnd::Item) if depth == 1 => {
                depth -= 1;
                items.push(build_item(&inner[item_start..i]));
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    items
}

fn build_item(events: &[Event<'_>]) -> ListItem {
    // The marker belongs to this item only if it shows up before any nested list.
    let checked = events
        .iter()
        .take_while(|event| !matches!(event, Event::Start(Tag::List(_))))
        .find_map(|event| match event {
            Event::TaskListMarker(checked) => Some(*checked),
            _ => None,
        });

    ListItem {
        html: HtmlWriter::for_list_item().render(events).trim().to_owned(),
        text: plain_text(events),
        checked,
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: pulldown_cmark::HeadingLevel) -> u8 {
    use pulldown_cmark::HeadingLevel;

    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Maps byte offsets to 1-based line numbers.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(next) => next,
        }
    }
}
