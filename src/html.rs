//! HTML fragment rendering from the canonical block structure.
//!
//! Pure string generation, no I/O. Text content is escaped by default;
//! raw HTML embedded in the source only passes through when the caller
//! opts in, since passthrough lets document authors inject arbitrary
//! markup into the composed page.

use crate::body::{Block, Inline};

/// Render blocks to an HTML fragment.
///
/// `raw_html` controls whether raw HTML nodes in the body pass through
/// unescaped. When false they are rendered as visible escaped text.
pub fn render(blocks: &[Block], raw_html: bool) -> String {
    let mut out = String::new();
    render_blocks(blocks, raw_html, &mut out);
    out
}

fn render_blocks(blocks: &[Block], raw_html: bool, out: &mut String) {
    for block in blocks {
        match block {
            Block::Heading { level, content } => {
                let level = (*level).clamp(1, 6);
                out.push_str(&format!("<h{level}>"));
                render_inlines(content, raw_html, out);
                out.push_str(&format!("</h{level}>\n"));
            }
            Block::Paragraph(inlines) => {
                out.push_str("<p>");
                render_inlines(inlines, raw_html, out);
                out.push_str("</p>\n");
            }
            Block::List {
                ordered,
                start,
                items,
            } => {
                if *ordered {
                    if *start != 1 {
                        out.push_str(&format!("<ol start=\"{start}\">\n"));
                    } else {
                        out.push_str("<ol>\n");
                    }
                } else {
                    out.push_str("<ul>\n");
                }
                for item in items {
                    out.push_str("<li>");
                    render_list_item(item, raw_html, out);
                    out.push_str("</li>\n");
                }
                out.push_str(if *ordered { "</ol>\n" } else { "</ul>\n" });
            }
            Block::CodeBlock { language, text } => {
                if language.is_empty() {
                    out.push_str("<pre><code>");
                } else {
                    out.push_str(&format!(
                        "<pre><code class=\"language-{}\">",
                        escape_attr(language)
                    ));
                }
                out.push_str(&escape_html(text));
                out.push_str("</code></pre>\n");
            }
            Block::BlockQuote(inner) => {
                out.push_str("<blockquote>\n");
                render_blocks(inner, raw_html, out);
                out.push_str("</blockquote>\n");
            }
            Block::Rule => out.push_str("<hr/>\n"),
            Block::Html(html) => {
                if raw_html {
                    out.push_str(html);
                } else {
                    out.push_str("<p>");
                    out.push_str(&escape_html(html.trim_end()));
                    out.push_str("</p>\n");
                }
            }
            Block::Table { head, rows } => {
                out.push_str("<table>\n<thead>\n<tr>");
                for cell in head {
                    out.push_str("<th>");
                    render_inlines(cell, raw_html, out);
                    out.push_str("</th>");
                }
                out.push_str("</tr>\n</thead>\n<tbody>\n");
                for row in rows {
                    out.push_str("<tr>");
                    for cell in row {
                        out.push_str("<td>");
                        render_inlines(cell, raw_html, out);
                        out.push_str("</td>");
                    }
                    out.push_str("</tr>\n");
                }
                out.push_str("</tbody>\n</table>\n");
            }
        }
    }
}

/// A single-paragraph item renders its content inline; anything richer
/// keeps full block markup inside the `<li>`.
fn render_list_item(item: &[Block], raw_html: bool, out: &mut String) {
    if let [Block::Paragraph(inlines)] = item {
        render_inlines(inlines, raw_html, out);
    } else {
        out.push('\n');
        render_blocks(item, raw_html, out);
    }
}

fn render_inlines(inlines: &[Inline], raw_html: bool, out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(&escape_html(text)),
            Inline::Code(code) => {
                out.push_str("<code>");
                out.push_str(&escape_html(code));
                out.push_str("</code>");
            }
            Inline::Emphasis(inner) => {
                out.push_str("<em>");
                render_inlines(inner, raw_html, out);
                out.push_str("</em>");
            }
            Inline::Strong(inner) => {
                out.push_str("<strong>");
                render_inlines(inner, raw_html, out);
                out.push_str("</strong>");
            }
            Inline::Strikethrough(inner) => {
                out.push_str("<del>");
                render_inlines(inner, raw_html, out);
                out.push_str("</del>");
            }
            Inline::Link {
                href,
                title,
                content,
            } => {
                out.push_str(&format!("<a href=\"{}\"", escape_attr(href)));
                if !title.is_empty() {
                    out.push_str(&format!(" title=\"{}\"", escape_attr(title)));
                }
                out.push('>');
                render_inlines(content, raw_html, out);
                out.push_str("</a>");
            }
            Inline::Image { src, alt } => {
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\"/>",
                    escape_attr(src),
                    escape_attr(alt)
                ));
            }
            Inline::Html(html) => {
                if raw_html {
                    out.push_str(html);
                } else {
                    out.push_str(&escape_html(html));
                }
            }
            Inline::SoftBreak => out.push('\n'),
            Inline::HardBreak => out.push_str("<br/>\n"),
        }
    }
}

/// Escape text content for HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value (quotes included).
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
