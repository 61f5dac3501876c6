//! PDF export branch.
//!
//! Renders the composed document to paginated PDF using the builtin
//! PDF fonts. Page geometry, fonts, sizes, alignment and block spacing
//! come from the template stylesheet (see [`crate::css`]); this module
//! lays out text with a cursor and knows nothing about résumés beyond
//! the standard metadata header every template shows.
//!
//! Builtin-font metrics are approximated with per-character width
//! factors, which is plenty for line wrapping a one-to-two page
//! document.

use std::io::{Seek, Write};

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use crate::body::{Block, Inline};
use crate::compose::ComposedDocument;
use crate::css::{ComputedStyle, FontFamily, PageGeometry, PrintStyles, TextAlign};
use crate::error::{Error, Result};
use crate::template::Template;

use super::{CONTACT_FIELDS, Exporter, LINK_FIELDS, field_line, html_text};

const PT_PER_MM: f32 = 72.0 / 25.4;

/// PDF format exporter.
pub struct PdfExporter {
    styles: PrintStyles,
}

impl PdfExporter {
    /// Create an exporter with the template's print styles.
    pub fn new(template: &Template) -> Self {
        Self {
            styles: PrintStyles::parse(&template.stylesheet),
        }
    }
}

impl Exporter for PdfExporter {
    type Source = ComposedDocument;

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn export<W: Write + Seek>(&self, source: &ComposedDocument, writer: &mut W) -> Result<()> {
        let title = source.metadata.get("name").unwrap_or("Résumé");
        let mut renderer = Renderer::new(&self.styles, title, source.raw_html)?;
        renderer.render_header(source)?;
        renderer.render_blocks(&source.blocks, 0.0)?;
        let bytes = renderer.finish()?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}

/// Character style of one laid-out word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunStyle {
    bold: bool,
    italic: bool,
    mono: bool,
}

/// A word plus its measured width at layout size.
#[derive(Debug, Clone)]
struct Word {
    text: String,
    style: RunStyle,
    width_pt: f32,
}

/// Cursor-based page layout over a printpdf document.
struct Renderer<'a> {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    styles: &'a PrintStyles,
    page: PageGeometry,
    /// Current baseline, in mm from the bottom of the page.
    y_mm: f32,
    /// Lazily loaded builtin fonts, indexed by family and face.
    fonts: [Option<IndirectFontRef>; 12],
    /// Matches the composed HTML: when raw markup passes through
    /// there, only its text content appears here; otherwise the markup
    /// is shown literally, as the escaped HTML would be.
    raw_html: bool,
}

impl<'a> Renderer<'a> {
    fn new(styles: &'a PrintStyles, title: &str, raw_html: bool) -> Result<Self> {
        let page = styles.page;
        let (doc, page_idx, layer_idx) =
            PdfDocument::new(title, Mm(page.width_mm), Mm(page.height_mm), "Layer 1");
        let layer = doc.get_page(page_idx).get_layer(layer_idx);
        let y_mm = page.height_mm - page.margin_top_mm;
        Ok(Self {
            doc,
            layer,
            styles,
            page,
            y_mm,
            fonts: Default::default(),
            raw_html,
        })
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| Error::Render(e.to_string()))
    }

    /// The standard metadata header: name, title, contact and link
    /// lines, all centered. Absent fields are omitted entirely.
    fn render_header(&mut self, doc: &ComposedDocument) -> Result<()> {
        let metadata = &doc.metadata;
        if let Some(name) = metadata.get("name") {
            let mut style = self.styles.computed("h1");
            style.align = TextAlign::Center;
            self.write_words(&[plain_word(name, &style)], &style, 0.0)?;
        }
        if let Some(title) = metadata.get("title") {
            let mut style = self.styles.computed("body");
            style.italic = true;
            style.align = TextAlign::Center;
            style.margin_bottom_pt = style.size_pt * 0.4;
            self.write_words(&[plain_word(title, &style)], &style, 0.0)?;
        }
        for fields in [CONTACT_FIELDS, LINK_FIELDS] {
            if let Some(line) = field_line(metadata, fields) {
                let mut style = self.styles.computed("body");
                style.align = TextAlign::Center;
                style.margin_bottom_pt = style.size_pt * 0.2;
                self.write_words(&[plain_word(&line, &style)], &style, 0.0)?;
            }
        }
        if !metadata.is_empty() {
            self.render_rule()?;
        }
        Ok(())
    }

    fn render_blocks(&mut self, blocks: &[Block], indent_mm: f32) -> Result<()> {
        for block in blocks {
            match block {
                Block::Heading { level, content } => {
                    let element = heading_element(*level);
                    self.write_text_block(element, content, indent_mm)?;
                }
                Block::Paragraph(inlines) => {
                    self.write_text_block("p", inlines, indent_mm)?;
                }
                Block::List {
                    ordered,
                    start,
                    items,
                } => {
                    self.render_list(*ordered, *start, items, indent_mm)?;
                }
                Block::CodeBlock { text, .. } => {
                    self.render_code_block(text, indent_mm)?;
                }
                Block::BlockQuote(inner) => {
                    self.render_blocks(inner, indent_mm + 6.0)?;
                }
                Block::Rule => self.render_rule()?,
                Block::Html(html) => {
                    // No CSS box model for raw markup here. In
                    // passthrough mode render its text content so
                    // nothing silently disappears; otherwise show the
                    // markup literally, like the escaped HTML does.
                    let text = if self.raw_html {
                        html_text(html)
                    } else {
                        html.trim_end().to_string()
                    };
                    if !text.is_empty() {
                        let inlines = [Inline::Text(text)];
                        self.write_text_block("p", &inlines, indent_mm)?;
                    }
                }
                Block::Table { head, rows } => {
                    self.render_table(head, rows, indent_mm)?;
                }
            }
        }
        Ok(())
    }

    fn render_list(
        &mut self,
        ordered: bool,
        start: u64,
        items: &[Vec<Block>],
        indent_mm: f32,
    ) -> Result<()> {
        let style = self.styles.computed("li");
        let hang_mm = 6.0;
        for (i, item) in items.iter().enumerate() {
            let marker = if ordered {
                format!("{}.", start + i as u64)
            } else {
                "\u{2022}".to_string()
            };
            // Keep the marker on the same baseline as the item's first
            // line: break the page first if the line would not fit.
            self.break_page_if_needed(line_height_mm(&style));
            let x = self.page.margin_left_mm + indent_mm;
            let font = self.font(run_style_for(&style))?.clone();
            self.set_color(style.color);
            self.layer
                .use_text(marker, style.size_pt, Mm(x), Mm(self.y_mm), &font);
            self.render_blocks(item, indent_mm + hang_mm)?;
        }
        Ok(())
    }

    fn render_code_block(&mut self, text: &str, indent_mm: f32) -> Result<()> {
        let style = self.styles.computed("pre");
        let font = self
            .font(RunStyle {
                bold: false,
                italic: false,
                mono: true,
            })?
            .clone();
        self.advance(style.margin_top_pt);
        for line in text.trim_end_matches('\n').split('\n') {
            self.break_page_if_needed(line_height_mm(&style));
            self.set_color(style.color);
            self.layer.use_text(
                line,
                style.size_pt,
                Mm(self.page.margin_left_mm + indent_mm),
                Mm(self.y_mm),
                &font,
            );
            self.y_mm -= line_height_mm(&style);
        }
        self.advance(style.margin_bottom_pt);
        Ok(())
    }

    /// Tables degrade to one line per row with ` | ` separators.
    fn render_table(
        &mut self,
        head: &[Vec<Inline>],
        rows: &[Vec<Vec<Inline>>],
        indent_mm: f32,
    ) -> Result<()> {
        if !head.is_empty() {
            let line = row_text(head);
            let inlines = [Inline::Strong(vec![Inline::Text(line)])];
            self.write_text_block("p", &inlines, indent_mm)?;
        }
        for row in rows {
            let inlines = [Inline::Text(row_text(row))];
            self.write_text_block("p", &inlines, indent_mm)?;
        }
        Ok(())
    }

    fn render_rule(&mut self) -> Result<()> {
        let gap = 3.0;
        self.break_page_if_needed(gap * 2.0);
        self.y_mm -= gap;
        let line = Line {
            points: vec![
                (Point::new(Mm(self.page.margin_left_mm), Mm(self.y_mm)), false),
                (
                    Point::new(
                        Mm(self.page.width_mm - self.page.margin_right_mm),
                        Mm(self.y_mm),
                    ),
                    false,
                ),
            ],
            is_closed: false,
        };
        self.layer.set_outline_thickness(0.75);
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.3, 0.3, 0.3, None)));
        self.layer.add_line(line);
        self.y_mm -= gap;
        Ok(())
    }

    fn write_text_block(&mut self, element: &str, inlines: &[Inline], indent_mm: f32) -> Result<()> {
        let style = self.styles.computed(element);
        let mut words = Vec::new();
        collect_words(
            inlines,
            run_style_for(&style),
            style.size_pt,
            style.family,
            self.raw_html,
            &mut words,
        );
        if words.is_empty() {
            return Ok(());
        }
        self.advance(style.margin_top_pt);
        self.write_words(&words, &style, indent_mm)?;
        self.advance(style.margin_bottom_pt);
        Ok(())
    }

    /// Wrap words into lines and emit them.
    fn write_words(&mut self, words: &[Word], style: &ComputedStyle, indent_mm: f32) -> Result<()> {
        let avail_pt =
            (self.page.width_mm - self.page.margin_left_mm - self.page.margin_right_mm - indent_mm)
                * PT_PER_MM;
        let space_pt = space_width_pt(style.size_pt);

        let mut lines: Vec<Vec<&Word>> = Vec::new();
        let mut current: Vec<&Word> = Vec::new();
        let mut width = 0.0f32;
        for word in words {
            if word.text == "\n" {
                lines.push(std::mem::take(&mut current));
                width = 0.0;
                continue;
            }
            let space = if current.is_empty() { 0.0 } else { space_pt };
            if !current.is_empty() && width + space + word.width_pt > avail_pt {
                lines.push(std::mem::take(&mut current));
                width = 0.0;
            }
            width += if current.is_empty() { 0.0 } else { space_pt };
            width += word.width_pt;
            current.push(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }

        self.set_color(style.color);
        for line in lines {
            self.break_page_if_needed(line_height_mm(style));
            let line_width_pt: f32 = line.iter().map(|w| w.width_pt).sum::<f32>()
                + space_pt * line.len().saturating_sub(1) as f32;
            let left_pt = (self.page.margin_left_mm + indent_mm) * PT_PER_MM;
            let mut x_pt = match style.align {
                TextAlign::Left => left_pt,
                TextAlign::Center => left_pt + (avail_pt - line_width_pt).max(0.0) / 2.0,
                TextAlign::Right => left_pt + (avail_pt - line_width_pt).max(0.0),
            };
            for word in line {
                let font = self.font(word.style)?.clone();
                self.layer.use_text(
                    word.text.as_str(),
                    style.size_pt,
                    Mm(x_pt / PT_PER_MM),
                    Mm(self.y_mm),
                    &font,
                );
                x_pt += word.width_pt + space_pt;
            }
            self.y_mm -= line_height_mm(style);
        }
        Ok(())
    }

    /// Consume vertical space without emitting anything.
    fn advance(&mut self, pt: f32) {
        self.y_mm -= pt / PT_PER_MM;
    }

    fn break_page_if_needed(&mut self, needed_mm: f32) {
        if self.y_mm - needed_mm < self.page.margin_bottom_mm {
            let (page_idx, layer_idx) =
                self.doc
                    .add_page(Mm(self.page.width_mm), Mm(self.page.height_mm), "Layer 1");
            self.layer = self.doc.get_page(page_idx).get_layer(layer_idx);
            self.y_mm = self.page.height_mm - self.page.margin_top_mm;
        }
    }

    fn set_color(&mut self, (r, g, b): (f32, f32, f32)) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    }

    /// Lazily register the builtin font for a run style.
    fn font(&mut self, style: RunStyle) -> Result<&IndirectFontRef> {
        let family = if style.mono {
            FontFamily::Monospace
        } else {
            self.styles.computed("body").family
        };
        let idx = font_index(family, style.bold, style.italic);
        match &mut self.fonts[idx] {
            Some(font) => Ok(font),
            slot @ None => {
                let font = self
                    .doc
                    .add_builtin_font(builtin_font(family, style.bold, style.italic))
                    .map_err(|e| Error::Render(e.to_string()))?;
                Ok(slot.insert(font))
            }
        }
    }
}

fn font_index(family: FontFamily, bold: bool, italic: bool) -> usize {
    let family = match family {
        FontFamily::SansSerif => 0,
        FontFamily::Serif => 1,
        FontFamily::Monospace => 2,
    };
    family * 4 + (bold as usize) * 2 + italic as usize
}

fn builtin_font(family: FontFamily, bold: bool, italic: bool) -> BuiltinFont {
    match (family, bold, italic) {
        (FontFamily::SansSerif, false, false) => BuiltinFont::Helvetica,
        (FontFamily::SansSerif, true, false) => BuiltinFont::HelveticaBold,
        (FontFamily::SansSerif, false, true) => BuiltinFont::HelveticaOblique,
        (FontFamily::SansSerif, true, true) => BuiltinFont::HelveticaBoldOblique,
        (FontFamily::Serif, false, false) => BuiltinFont::TimesRoman,
        (FontFamily::Serif, true, false) => BuiltinFont::TimesBold,
        (FontFamily::Serif, false, true) => BuiltinFont::TimesItalic,
        (FontFamily::Serif, true, true) => BuiltinFont::TimesBoldItalic,
        (FontFamily::Monospace, false, false) => BuiltinFont::Courier,
        (FontFamily::Monospace, true, false) => BuiltinFont::CourierBold,
        (FontFamily::Monospace, false, true) => BuiltinFont::CourierOblique,
        (FontFamily::Monospace, true, true) => BuiltinFont::CourierBoldOblique,
    }
}

fn heading_element(level: u8) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

fn run_style_for(style: &ComputedStyle) -> RunStyle {
    RunStyle {
        bold: style.bold,
        italic: style.italic,
        mono: style.family == FontFamily::Monospace,
    }
}

fn line_height_mm(style: &ComputedStyle) -> f32 {
    style.size_pt * style.line_height / PT_PER_MM
}

fn plain_word(text: &str, style: &ComputedStyle) -> Word {
    let run = run_style_for(style);
    Word {
        width_pt: measure_pt(text, style.size_pt, style.family, run),
        text: text.to_string(),
        style: run,
    }
}

/// Flatten inline content into styled words for wrapping.
fn collect_words(
    inlines: &[Inline],
    style: RunStyle,
    size_pt: f32,
    family: FontFamily,
    raw_html: bool,
    out: &mut Vec<Word>,
) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => push_tokens(out, text, style, size_pt, family),
            Inline::Code(code) => {
                push_tokens(out, code, RunStyle { mono: true, ..style }, size_pt, family);
            }
            Inline::Emphasis(inner) => {
                collect_words(inner, RunStyle { italic: true, ..style }, size_pt, family, raw_html, out);
            }
            Inline::Strong(inner) => {
                collect_words(inner, RunStyle { bold: true, ..style }, size_pt, family, raw_html, out);
            }
            Inline::Strikethrough(inner) => {
                collect_words(inner, style, size_pt, family, raw_html, out)
            }
            Inline::Link { content, .. } => {
                collect_words(content, style, size_pt, family, raw_html, out)
            }
            Inline::Image { alt, .. } => push_tokens(out, alt, style, size_pt, family),
            Inline::Html(html) => {
                if raw_html {
                    push_tokens(out, &html_text(html), style, size_pt, family);
                } else {
                    push_tokens(out, html, style, size_pt, family);
                }
            }
            Inline::SoftBreak => {}
            Inline::HardBreak => out.push(Word {
                text: "\n".to_string(),
                style,
                width_pt: 0.0,
            }),
        }
    }
}

fn push_tokens(out: &mut Vec<Word>, text: &str, style: RunStyle, size_pt: f32, family: FontFamily) {
    for token in text.split_whitespace() {
        out.push(Word {
            text: token.to_string(),
            style,
            width_pt: measure_pt(token, size_pt, family, style),
        });
    }
}

/// Approximate text width in points for a builtin font.
fn measure_pt(text: &str, size_pt: f32, family: FontFamily, style: RunStyle) -> f32 {
    let mono = style.mono || family == FontFamily::Monospace;
    let mut width = 0.0f32;
    for c in text.chars() {
        let factor = if mono {
            0.6
        } else {
            match c {
                'i' | 'l' | 'j' | 't' | 'f' | 'I' | '.' | ',' | ':' | ';' | '!' | '|' | '\''
                | '`' | '(' | ')' | '[' | ']' => 0.32,
                'm' | 'w' | 'M' | 'W' | '@' => 0.85,
                'A'..='Z' => 0.68,
                '0'..='9' => 0.55,
                ' ' => 0.27,
                _ => 0.52,
            }
        };
        let factor = if style.bold && !mono { factor + 0.03 } else { factor };
        width += factor * size_pt;
    }
    width
}

fn space_width_pt(size_pt: f32) -> f32 {
    0.27 * size_pt
}

/// Flatten one table row to `cell | cell` text.
fn row_text(cells: &[Vec<Inline>]) -> String {
    cells
        .iter()
        .map(|cell| Inline::plain_text(cell))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::Resume;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn template() -> Template {
        Template {
            name: "test".to_string(),
            dir: PathBuf::new(),
            skeleton: "<html><body>{{ content }}</body></html>".to_string(),
            stylesheet: "body { font-family: Helvetica, sans-serif; font-size: 11pt; }"
                .to_string(),
        }
    }

    fn compose(input: &str) -> ComposedDocument {
        let resume = Resume::parse(input).unwrap();
        crate::compose::compose(&resume, &template(), false)
    }

    #[test]
    fn test_export_produces_pdf_bytes() {
        let doc = compose("---\nname: Jane\n---\n# Summary\nHello world\n");
        let exporter = PdfExporter::new(&template());
        let mut out = Cursor::new(Vec::new());
        exporter.export(&doc, &mut out).unwrap();
        let bytes = out.into_inner();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_long_document_paginates() {
        let mut input = String::from("# Experience\n\n");
        for i in 0..200 {
            input.push_str(&format!("Paragraph number {i} with some filler text.\n\n"));
        }
        let doc = compose(&input);
        let exporter = PdfExporter::new(&template());
        let mut out = Cursor::new(Vec::new());
        exporter.export(&doc, &mut out).unwrap();
        // One /Pages node plus one /Page per page: three or more
        // matches means the document paginated.
        let text = String::from_utf8_lossy(&out.into_inner()).to_string();
        assert!(text.matches("/Page").count() >= 3);
    }

    #[test]
    fn test_measure_is_monotonic() {
        let thin = measure_pt("ill", 11.0, FontFamily::SansSerif, RunStyle {
            bold: false,
            italic: false,
            mono: false,
        });
        let wide = measure_pt("WWW", 11.0, FontFamily::SansSerif, RunStyle {
            bold: false,
            italic: false,
            mono: false,
        });
        assert!(wide > thin);
    }
}
