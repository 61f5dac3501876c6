//! Canonical block structure for the résumé body.
//!
//! The body text is parsed exactly once into a tree of [`Block`] and
//! [`Inline`] nodes, and every consumer (the HTML renderer feeding the
//! PDF branch, and the DOCX exporter) walks this same structure. This
//! removes the class of bugs where two exporters re-parse the raw text
//! and disagree on edge-case Markdown.
//!
//! Parsing is delegated to `pulldown-cmark` with tables, strikethrough
//! and smart punctuation enabled; this module only folds the event
//! stream into a tree.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// A block-level element of the body.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Heading with level 1-6.
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    /// Bullet or numbered list. Each item is a sequence of blocks so
    /// nested lists and multi-paragraph items keep their structure.
    List {
        ordered: bool,
        start: u64,
        items: Vec<Vec<Block>>,
    },
    /// Fenced or indented code block. The language tag may be empty.
    CodeBlock { language: String, text: String },
    BlockQuote(Vec<Block>),
    /// Horizontal rule.
    Rule,
    /// Raw HTML block, passed through or escaped downstream.
    Html(String),
    /// Table with a header row and body rows of inline cells.
    Table {
        head: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
}

/// An inline element within a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        href: String,
        title: String,
        content: Vec<Inline>,
    },
    Image {
        src: String,
        alt: String,
    },
    /// Raw inline HTML.
    Html(String),
    SoftBreak,
    HardBreak,
}

impl Inline {
    /// Flatten an inline tree to its plain text content.
    pub fn plain_text(inlines: &[Inline]) -> String {
        let mut out = String::new();
        collect_text(inlines, &mut out);
        out
    }
}

fn collect_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) => out.push_str(t),
            Inline::Emphasis(inner) | Inline::Strong(inner) | Inline::Strikethrough(inner) => {
                collect_text(inner, out);
            }
            Inline::Link { content, .. } => collect_text(content, out),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::Html(_) => {}
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
        }
    }
}

/// Parse body text into the canonical block structure.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);

    let mut builder = Builder::new();
    for event in Parser::new_ext(text, options) {
        builder.event(event);
    }
    builder.finish()
}

/// Open block container on the builder stack.
enum Frame {
    Root(Vec<Block>),
    List {
        ordered: bool,
        start: u64,
        items: Vec<Vec<Block>>,
    },
    Item(Vec<Block>),
    Quote(Vec<Block>),
    Table {
        head: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
        current_row: Vec<Vec<Inline>>,
        in_head: bool,
    },
}

/// Open inline span on the builder stack.
enum Span {
    /// The block's base inline run (paragraph/heading content or a
    /// table cell).
    Base(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        href: String,
        title: String,
        content: Vec<Inline>,
    },
    Image {
        src: String,
        content: Vec<Inline>,
    },
}

impl Span {
    fn inlines(&mut self) -> &mut Vec<Inline> {
        match self {
            Span::Base(v)
            | Span::Emphasis(v)
            | Span::Strong(v)
            | Span::Strikethrough(v)
            | Span::Link { content: v, .. }
            | Span::Image { content: v, .. } => v,
        }
    }
}

/// Folds the pulldown-cmark event stream into a block tree.
struct Builder {
    frames: Vec<Frame>,
    spans: Vec<Span>,
    /// An inline run opened without an explicit paragraph (tight list
    /// items emit bare text events).
    implicit_paragraph: bool,
    /// Buffer for an open code block: (language, text).
    code_block: Option<(String, String)>,
    /// Buffer for an open raw HTML block.
    html_block: Option<String>,
}

impl Builder {
    fn new() -> Self {
        Self {
            frames: vec![Frame::Root(Vec::new())],
            spans: Vec::new(),
            implicit_paragraph: false,
            code_block: None,
            html_block: None,
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_implicit();
        match self.frames.pop() {
            Some(Frame::Root(blocks)) => blocks,
            _ => Vec::new(),
        }
    }

    fn event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some((_, buf)) = self.code_block.as_mut() {
                    buf.push_str(&text);
                } else if let Some(buf) = self.html_block.as_mut() {
                    buf.push_str(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(text) => {
                self.ensure_inline();
                self.push_inline(Inline::Code(text.to_string()));
            }
            Event::Html(html) => {
                if let Some(buf) = self.html_block.as_mut() {
                    buf.push_str(&html);
                } else {
                    self.push_block(Block::Html(html.to_string()));
                }
            }
            Event::InlineHtml(html) => {
                self.ensure_inline();
                self.push_inline(Inline::Html(html.to_string()));
            }
            Event::SoftBreak => {
                self.ensure_inline();
                self.push_inline(Inline::SoftBreak);
            }
            Event::HardBreak => {
                self.ensure_inline();
                self.push_inline(Inline::HardBreak);
            }
            Event::Rule => self.push_block(Block::Rule),
            // Footnotes, task lists and math are not enabled.
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {
                self.flush_implicit();
                self.spans.push(Span::Base(Vec::new()));
            }
            Tag::Heading { .. } => {
                self.flush_implicit();
                self.spans.push(Span::Base(Vec::new()));
            }
            Tag::List(start) => {
                self.flush_implicit();
                self.frames.push(Frame::List {
                    ordered: start.is_some(),
                    start: start.unwrap_or(1),
                    items: Vec::new(),
                });
            }
            Tag::Item => {
                self.frames.push(Frame::Item(Vec::new()));
            }
            Tag::BlockQuote(_) => {
                self.flush_implicit();
                self.frames.push(Frame::Quote(Vec::new()));
            }
            Tag::CodeBlock(kind) => {
                self.flush_implicit();
                let language = match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code_block = Some((language, String::new()));
            }
            Tag::HtmlBlock => {
                self.flush_implicit();
                self.html_block = Some(String::new());
            }
            Tag::Emphasis => {
                self.ensure_inline();
                self.spans.push(Span::Emphasis(Vec::new()));
            }
            Tag::Strong => {
                self.ensure_inline();
                self.spans.push(Span::Strong(Vec::new()));
            }
            Tag::Strikethrough => {
                self.ensure_inline();
                self.spans.push(Span::Strikethrough(Vec::new()));
            }
            Tag::Link {
                dest_url, title, ..
            } => {
                self.ensure_inline();
                self.spans.push(Span::Link {
                    href: dest_url.to_string(),
                    title: title.to_string(),
                    content: Vec::new(),
                });
            }
            Tag::Image { dest_url, .. } => {
                self.ensure_inline();
                self.spans.push(Span::Image {
                    src: dest_url.to_string(),
                    content: Vec::new(),
                });
            }
            Tag::Table(_) => {
                self.flush_implicit();
                self.frames.push(Frame::Table {
                    head: Vec::new(),
                    rows: Vec::new(),
                    current_row: Vec::new(),
                    in_head: false,
                });
            }
            Tag::TableHead => {
                if let Some(Frame::Table { in_head, .. }) = self.frames.last_mut() {
                    *in_head = true;
                }
            }
            Tag::TableRow => {}
            Tag::TableCell => {
                self.spans.push(Span::Base(Vec::new()));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if let Some(Span::Base(inlines)) = self.spans.pop() {
                    self.push_block(Block::Paragraph(inlines));
                }
            }
            TagEnd::Heading(level) => {
                if let Some(Span::Base(inlines)) = self.spans.pop() {
                    self.push_block(Block::Heading {
                        level: level as u8,
                        content: inlines,
                    });
                }
            }
            TagEnd::List(_) => {
                self.flush_implicit();
                if let Some(Frame::List {
                    ordered,
                    start,
                    items,
                }) = self.frames.pop()
                {
                    self.push_block(Block::List {
                        ordered,
                        start,
                        items,
                    });
                }
            }
            TagEnd::Item => {
                self.flush_implicit();
                if let Some(Frame::Item(blocks)) = self.frames.pop()
                    && let Some(Frame::List { items, .. }) = self.frames.last_mut()
                {
                    items.push(blocks);
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush_implicit();
                if let Some(Frame::Quote(blocks)) = self.frames.pop() {
                    self.push_block(Block::BlockQuote(blocks));
                }
            }
            TagEnd::CodeBlock => {
                if let Some((language, text)) = self.code_block.take() {
                    self.push_block(Block::CodeBlock { language, text });
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html_block.take() {
                    self.push_block(Block::Html(html));
                }
            }
            TagEnd::Emphasis => {
                if let Some(Span::Emphasis(inner)) = self.spans.pop() {
                    self.push_inline(Inline::Emphasis(inner));
                }
            }
            TagEnd::Strong => {
                if let Some(Span::Strong(inner)) = self.spans.pop() {
                    self.push_inline(Inline::Strong(inner));
                }
            }
            TagEnd::Strikethrough => {
                if let Some(Span::Strikethrough(inner)) = self.spans.pop() {
                    self.push_inline(Inline::Strikethrough(inner));
                }
            }
            TagEnd::Link => {
                if let Some(Span::Link {
                    href,
                    title,
                    content,
                }) = self.spans.pop()
                {
                    self.push_inline(Inline::Link {
                        href,
                        title,
                        content,
                    });
                }
            }
            TagEnd::Image => {
                if let Some(Span::Image { src, content }) = self.spans.pop() {
                    let alt = Inline::plain_text(&content);
                    self.push_inline(Inline::Image { src, alt });
                }
            }
            TagEnd::Table => {
                if let Some(Frame::Table { head, rows, .. }) = self.frames.pop() {
                    self.push_block(Block::Table { head, rows });
                }
            }
            TagEnd::TableHead => {
                if let Some(Frame::Table {
                    head,
                    current_row,
                    in_head,
                    ..
                }) = self.frames.last_mut()
                {
                    *head = std::mem::take(current_row);
                    *in_head = false;
                }
            }
            TagEnd::TableRow => {
                if let Some(Frame::Table {
                    rows, current_row, ..
                }) = self.frames.last_mut()
                {
                    rows.push(std::mem::take(current_row));
                }
            }
            TagEnd::TableCell => {
                if let Some(Span::Base(inlines)) = self.spans.pop()
                    && let Some(Frame::Table { current_row, .. }) = self.frames.last_mut()
                {
                    current_row.push(inlines);
                }
            }
            _ => {}
        }
    }

    /// Open an implicit paragraph when inline content appears outside
    /// an explicit one (tight list items).
    fn ensure_inline(&mut self) {
        if self.spans.is_empty() {
            self.spans.push(Span::Base(Vec::new()));
            self.implicit_paragraph = true;
        }
    }

    /// Close an implicit paragraph before the next block begins.
    fn flush_implicit(&mut self) {
        if self.implicit_paragraph {
            self.implicit_paragraph = false;
            if let Some(Span::Base(inlines)) = self.spans.pop()
                && !inlines.is_empty()
            {
                self.push_block(Block::Paragraph(inlines));
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        self.ensure_inline();
        let inlines = self
            .spans
            .last_mut()
            .expect("span stack is non-empty")
            .inlines();
        // Merge adjacent text runs (smart punctuation splits them).
        if let Some(Inline::Text(existing)) = inlines.last_mut() {
            existing.push_str(text);
        } else {
            inlines.push(Inline::Text(text.to_string()));
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        self.ensure_inline();
        self.spans
            .last_mut()
            .expect("span stack is non-empty")
            .inlines()
            .push(inline);
    }

    fn push_block(&mut self, block: Block) {
        self.flush_implicit();
        match self.frames.last_mut() {
            Some(Frame::Root(blocks))
            | Some(Frame::Item(blocks))
            | Some(Frame::Quote(blocks)) => blocks.push(block),
            // Blocks cannot appear directly inside a list or table;
            // drop rather than panic on malformed event order.
            _ => {}
        }
    }
}
