//! DOCX export branch.
//!
//! Builds a minimal WordprocessingML package: a zip archive with
//! `[Content_Types].xml`, the package relationships, and the document,
//! styles and numbering parts under `word/`. Formatting is applied
//! directly to runs and paragraphs, driven by the per-template
//! [`DocxStyleMap`]; run sizes are in half-points as OOXML requires.

use std::io::{Seek, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::body::{Block, Inline};
use crate::error::{Error, Result};
use crate::frontmatter::Metadata;
use crate::resume::Resume;
use crate::template::Template;

use super::{CONTACT_FIELDS, Exporter, LINK_FIELDS, field_line, html_text};

/// Bullet lists share one numbering definition; they carry no counter.
const BULLET_NUM_ID: u32 = 1;

/// Each ordered list gets its own numbering instance so counters never
/// continue across separate lists.
const FIRST_ORDERED_NUM_ID: u32 = 2;

/// Indent step per list level, in twips (0.5 inch).
const INDENT_TWIPS: u32 = 720;

/// Per-template DOCX fonts and sizes.
///
/// DOCX output cannot reuse the template stylesheet, so each template
/// name maps to an equivalent Word look here.
#[derive(Debug, Clone, Copy)]
pub struct DocxStyleMap {
    pub body_font: &'static str,
    pub heading_font: &'static str,
    /// Body run size in half-points (22 = 11pt).
    pub body_half_pt: u32,
    pub h1_half_pt: u32,
    pub h2_half_pt: u32,
    /// Size of the name line in the header.
    pub name_half_pt: u32,
}

impl DocxStyleMap {
    /// Look up the style map for a template name. Unknown templates
    /// fall back to the `ats_classic` look.
    pub fn for_template(name: &str) -> Self {
        match name {
            "modern" => Self {
                body_font: "Helvetica",
                heading_font: "Helvetica",
                body_half_pt: 21,
                h1_half_pt: 26,
                h2_half_pt: 23,
                name_half_pt: 40,
            },
            _ => Self {
                body_font: "Georgia",
                heading_font: "Arial",
                body_half_pt: 22,
                h1_half_pt: 28,
                h2_half_pt: 24,
                name_half_pt: 36,
            },
        }
    }
}

/// DOCX format exporter.
pub struct DocxExporter {
    map: DocxStyleMap,
}

impl DocxExporter {
    /// Create an exporter styled for the given template.
    pub fn new(template: &Template) -> Self {
        Self {
            map: DocxStyleMap::for_template(&template.name),
        }
    }
}

impl Exporter for DocxExporter {
    type Source = Resume;

    fn extension(&self) -> &'static str {
        "docx"
    }

    fn export<W: Write + Seek>(&self, source: &Resume, writer: &mut W) -> Result<()> {
        let mut builder = DocumentBuilder::new(&self.map);
        builder.render_header(&source.metadata);
        builder.render_blocks(&source.blocks, 0);
        let document = builder.document_xml();
        let numbering = builder.numbering_xml();

        let mut zip = ZipWriter::new(writer);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, String); 6] = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("word/document.xml", document),
            ("word/styles.xml", self.styles_xml()),
            ("word/numbering.xml", numbering),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ];
        for (name, content) in parts {
            zip.start_file(name, deflated).map_err(zip_error)?;
            zip.write_all(content.as_bytes())?;
        }
        zip.finish().map_err(zip_error)?;
        Ok(())
    }
}

impl DocxExporter {
    fn styles_xml(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}"/><w:sz w:val="{sz}"/><w:szCs w:val="{sz}"/></w:rPr></w:rPrDefault>
    <w:pPrDefault><w:pPr><w:spacing w:after="120"/></w:pPr></w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
"#,
            font = escape_xml(self.map.body_font),
            sz = self.map.body_half_pt,
        );
        // Named heading styles so outline navigation and style-based
        // tooling see real headings, not bold body text.
        let levels = [
            ("Heading1", "heading 1", self.map.h1_half_pt, 0u32),
            ("Heading2", "heading 2", self.map.h2_half_pt, 1),
            ("Heading3", "heading 3", self.map.body_half_pt, 2),
        ];
        for (id, name, size, outline) in levels {
            xml.push_str(&format!(
                "  <w:style w:type=\"paragraph\" w:styleId=\"{id}\"><w:name w:val=\"{name}\"/><w:basedOn w:val=\"Normal\"/><w:pPr><w:outlineLvl w:val=\"{outline}\"/></w:pPr><w:rPr><w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\"/><w:b/><w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/></w:rPr></w:style>\n",
                font = escape_xml(self.map.heading_font),
            ));
        }
        xml.push_str("</w:styles>\n");
        xml
    }
}

fn zip_error(e: zip::result::ZipError) -> Error {
    Error::Export(e.to_string())
}

/// Character formatting of one run.
#[derive(Debug, Clone, Copy, Default)]
struct RunProps {
    bold: bool,
    italic: bool,
    strike: bool,
    mono: bool,
    /// Font override; `None` inherits the document default.
    font: Option<&'static str>,
    /// Size override in half-points.
    size: Option<u32>,
}

/// Accumulates document.xml body paragraphs and the ordered-list
/// numbering instances they reference.
struct DocumentBuilder<'a> {
    map: &'a DocxStyleMap,
    body: String,
    /// Start value of each ordered list, in numId order.
    ordered_starts: Vec<u64>,
}

impl<'a> DocumentBuilder<'a> {
    fn new(map: &'a DocxStyleMap) -> Self {
        Self {
            map,
            body: String::new(),
            ordered_starts: Vec::new(),
        }
    }

    /// The standard metadata header: centered name, title, contact and
    /// link lines, closed by a horizontal rule. Absent fields leave no
    /// trace.
    fn render_header(&mut self, metadata: &Metadata) {
        if let Some(name) = metadata.get("name") {
            let props = RunProps {
                bold: true,
                font: Some(self.map.heading_font),
                size: Some(self.map.name_half_pt),
                ..Default::default()
            };
            self.push_paragraph("<w:jc w:val=\"center\"/>", &text_run(name, props, self.map));
        }
        if let Some(title) = metadata.get("title") {
            let props = RunProps {
                italic: true,
                size: Some(self.map.h2_half_pt),
                ..Default::default()
            };
            self.push_paragraph("<w:jc w:val=\"center\"/>", &text_run(title, props, self.map));
        }
        for fields in [CONTACT_FIELDS, LINK_FIELDS] {
            if let Some(line) = field_line(metadata, fields) {
                self.push_paragraph(
                    "<w:jc w:val=\"center\"/>",
                    &text_run(&line, RunProps::default(), self.map),
                );
            }
        }
        if !metadata.is_empty() {
            self.push_rule();
        }
    }

    fn render_blocks(&mut self, blocks: &[Block], depth: usize) {
        for block in blocks {
            match block {
                Block::Heading { level, content } => self.render_heading(*level, content),
                Block::Paragraph(inlines) => {
                    let runs = self.runs(inlines, RunProps::default());
                    self.push_paragraph(&indent_ppr(depth), &runs);
                }
                Block::List {
                    ordered,
                    start,
                    items,
                } => self.render_list(*ordered, *start, items, depth),
                Block::CodeBlock { text, .. } => self.render_code_block(text, depth),
                Block::BlockQuote(inner) => self.render_quote(inner, depth),
                Block::Rule => self.push_rule(),
                Block::Html(html) => {
                    let text = html_text(html);
                    if !text.is_empty() {
                        let runs = text_run(&text, RunProps::default(), self.map);
                        self.push_paragraph(&indent_ppr(depth), &runs);
                    }
                }
                Block::Table { head, rows } => self.render_table(head, rows, depth),
            }
        }
    }

    fn render_heading(&mut self, level: u8, content: &[Inline]) {
        let size = match level {
            1 => self.map.h1_half_pt,
            2 => self.map.h2_half_pt,
            _ => self.map.body_half_pt,
        };
        let props = RunProps {
            bold: true,
            font: Some(self.map.heading_font),
            size: Some(size),
            ..Default::default()
        };
        let runs = self.runs(content, props);
        // h4..h6 have no body size distinct from h3; they share its style.
        let ppr = format!("<w:pStyle w:val=\"Heading{}\"/>", level.min(3));
        self.push_paragraph(&ppr, &runs);
    }

    fn render_list(&mut self, ordered: bool, start: u64, items: &[Vec<Block>], depth: usize) {
        let num_id = if ordered {
            self.ordered_starts.push(start);
            FIRST_ORDERED_NUM_ID + (self.ordered_starts.len() - 1) as u32
        } else {
            BULLET_NUM_ID
        };
        // WordprocessingML numbering definitions here go three levels
        // deep; anything deeper keeps the innermost indent.
        let ilvl = depth.min(2);
        for item in items {
            let mut first = true;
            for block in item {
                match block {
                    Block::Paragraph(inlines) if first => {
                        let runs = self.runs(inlines, RunProps::default());
                        let ppr = format!(
                            "<w:numPr><w:ilvl w:val=\"{ilvl}\"/><w:numId w:val=\"{num_id}\"/></w:numPr>"
                        );
                        self.push_paragraph(&ppr, &runs);
                    }
                    Block::List {
                        ordered,
                        start,
                        items,
                    } => self.render_list(*ordered, *start, items, depth + 1),
                    other => self.render_blocks(std::slice::from_ref(other), depth + 1),
                }
                first = false;
            }
        }
    }

    fn render_code_block(&mut self, text: &str, depth: usize) {
        let props = RunProps {
            mono: true,
            ..Default::default()
        };
        for line in text.trim_end_matches('\n').split('\n') {
            let runs = text_run(line, props, self.map);
            self.push_paragraph(&indent_ppr(depth + 1), &runs);
        }
    }

    fn render_quote(&mut self, blocks: &[Block], depth: usize) {
        // Quotes indent one level; inline emphasis inside is preserved
        // as-is rather than forcing the whole quote italic.
        self.render_blocks(blocks, depth + 1);
    }

    /// Tables degrade to one paragraph per row with ` | ` separators,
    /// with the header row bold.
    fn render_table(&mut self, head: &[Vec<Inline>], rows: &[Vec<Vec<Inline>>], depth: usize) {
        if !head.is_empty() {
            let props = RunProps {
                bold: true,
                ..Default::default()
            };
            let runs = text_run(&row_text(head), props, self.map);
            self.push_paragraph(&indent_ppr(depth), &runs);
        }
        for row in rows {
            let runs = text_run(&row_text(row), RunProps::default(), self.map);
            self.push_paragraph(&indent_ppr(depth), &runs);
        }
    }

    /// Horizontal rule: an empty paragraph carrying a bottom border.
    fn push_rule(&mut self) {
        self.body.push_str(
            "<w:p><w:pPr><w:pBdr><w:bottom w:val=\"single\" w:sz=\"6\" w:space=\"1\" w:color=\"666666\"/></w:pBdr></w:pPr></w:p>",
        );
    }

    fn push_paragraph(&mut self, ppr: &str, runs: &str) {
        if ppr.is_empty() {
            self.body.push_str(&format!("<w:p>{runs}</w:p>"));
        } else {
            self.body
                .push_str(&format!("<w:p><w:pPr>{ppr}</w:pPr>{runs}</w:p>"));
        }
    }

    /// Flatten inline content into run XML.
    fn runs(&self, inlines: &[Inline], props: RunProps) -> String {
        let mut out = String::new();
        push_runs(&mut out, inlines, props, self.map);
        out
    }

    fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>
"#,
            self.body
        )
    }

    fn numbering_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        );
        // Abstract 0: bullets, three levels. Abstract 1: decimal.
        xml.push_str("<w:abstractNum w:abstractNumId=\"0\">");
        for lvl in 0..3u32 {
            xml.push_str(&format!(
                "<w:lvl w:ilvl=\"{lvl}\"><w:numFmt w:val=\"bullet\"/><w:lvlText w:val=\"\u{2022}\"/><w:pPr><w:ind w:left=\"{}\" w:hanging=\"360\"/></w:pPr></w:lvl>",
                INDENT_TWIPS * (lvl + 1)
            ));
        }
        xml.push_str("</w:abstractNum>");
        xml.push_str("<w:abstractNum w:abstractNumId=\"1\">");
        for lvl in 0..3u32 {
            xml.push_str(&format!(
                "<w:lvl w:ilvl=\"{lvl}\"><w:start w:val=\"1\"/><w:numFmt w:val=\"decimal\"/><w:lvlText w:val=\"%{}.\"/><w:pPr><w:ind w:left=\"{}\" w:hanging=\"360\"/></w:pPr></w:lvl>",
                lvl + 1,
                INDENT_TWIPS * (lvl + 1)
            ));
        }
        xml.push_str("</w:abstractNum>");
        xml.push_str(&format!(
            "<w:num w:numId=\"{BULLET_NUM_ID}\"><w:abstractNumId w:val=\"0\"/></w:num>"
        ));
        for (i, start) in self.ordered_starts.iter().enumerate() {
            let num_id = FIRST_ORDERED_NUM_ID + i as u32;
            xml.push_str(&format!(
                "<w:num w:numId=\"{num_id}\"><w:abstractNumId w:val=\"1\"/><w:lvlOverride w:ilvl=\"0\"><w:startOverride w:val=\"{start}\"/></w:lvlOverride></w:num>"
            ));
        }
        xml.push_str("</w:numbering>\n");
        xml
    }
}

fn indent_ppr(depth: usize) -> String {
    if depth == 0 {
        String::new()
    } else {
        format!("<w:ind w:left=\"{}\"/>", INDENT_TWIPS * depth as u32)
    }
}

fn push_runs(out: &mut String, inlines: &[Inline], props: RunProps, map: &DocxStyleMap) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(&text_run(text, props, map)),
            Inline::Code(code) => {
                let props = RunProps { mono: true, ..props };
                out.push_str(&text_run(code, props, map));
            }
            Inline::Emphasis(inner) => {
                push_runs(out, inner, RunProps { italic: true, ..props }, map);
            }
            Inline::Strong(inner) => {
                push_runs(out, inner, RunProps { bold: true, ..props }, map);
            }
            Inline::Strikethrough(inner) => {
                push_runs(out, inner, RunProps { strike: true, ..props }, map);
            }
            Inline::Link { content, .. } => push_runs(out, content, props, map),
            Inline::Image { alt, .. } => out.push_str(&text_run(alt, props, map)),
            Inline::Html(html) => {
                let text = html_text(html);
                if !text.is_empty() {
                    out.push_str(&text_run(&text, props, map));
                }
            }
            Inline::SoftBreak => out.push_str(&text_run(" ", props, map)),
            Inline::HardBreak => out.push_str("<w:r><w:br/></w:r>"),
        }
    }
}

fn text_run(text: &str, props: RunProps, map: &DocxStyleMap) -> String {
    let mut rpr = String::new();
    let font = if props.mono {
        Some("Courier New")
    } else {
        props.font
    };
    if let Some(font) = font {
        rpr.push_str(&format!(
            "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\"/>"
        ));
    }
    if props.bold {
        rpr.push_str("<w:b/>");
    }
    if props.italic {
        rpr.push_str("<w:i/>");
    }
    if props.strike {
        rpr.push_str("<w:strike/>");
    }
    let size = props.size.unwrap_or(if props.mono {
        map.body_half_pt.saturating_sub(2)
    } else {
        map.body_half_pt
    });
    if size != map.body_half_pt {
        rpr.push_str(&format!("<w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/>"));
    }
    let rpr = if rpr.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{rpr}</w:rPr>")
    };
    format!(
        "<w:r>{rpr}<w:t xml:space=\"preserve\">{}</w:t></w:r>",
        escape_xml(text)
    )
}

/// Flatten one table row to `cell | cell` text.
fn row_text(cells: &[Vec<Inline>]) -> String {
    cells
        .iter()
        .map(|cell| Inline::plain_text(cell))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Escape text for XML content and attribute values.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
</Types>
"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>
"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
</Relationships>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::path::PathBuf;

    fn template(name: &str) -> Template {
        Template {
            name: name.to_string(),
            dir: PathBuf::new(),
            skeleton: String::new(),
            stylesheet: String::new(),
        }
    }

    fn export_document_xml(input: &str) -> String {
        let resume = Resume::parse(input).unwrap();
        let exporter = DocxExporter::new(&template("ats_classic"));
        let mut out = Cursor::new(Vec::new());
        exporter.export(&resume, &mut out).unwrap();
        read_part(out, "word/document.xml")
    }

    fn read_part(cursor: Cursor<Vec<u8>>, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(cursor).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_header_fields_joined_with_pipes() {
        let xml = export_document_xml(
            "---\nname: Jane Doe\nemail: jane@example.com\nlocation: Lisbon\n---\nBody\n",
        );
        assert!(xml.contains("Jane Doe"));
        assert!(xml.contains("jane@example.com | Lisbon"));
        assert!(xml.contains("<w:jc w:val=\"center\"/>"));
    }

    #[test]
    fn test_absent_fields_leave_no_separator() {
        let xml = export_document_xml("---\nname: Jane\nphone: 555-0100\n---\nBody\n");
        assert!(xml.contains(">555-0100<"));
        assert!(!xml.contains("| 555-0100"));
        assert!(!xml.contains("555-0100 |"));
    }

    #[test]
    fn test_text_is_xml_escaped() {
        // `<widgets>` parses as inline markup, so only its tag is
        // dropped; the surrounding text survives with `&` escaped.
        let xml = export_document_xml("Worked at AT&T on <widgets>\n");
        assert!(xml.contains("Worked at AT"));
        assert!(xml.contains("&amp;"));
        assert!(!xml.contains("widgets"));
    }

    #[test]
    fn test_inline_markup_keeps_wrapped_text() {
        let xml = export_document_xml("Press <kbd>Enter</kbd> to continue\n");
        assert!(!xml.contains("kbd"));
        assert!(xml.contains("Press "));
        assert!(xml.contains("Enter"));
        assert!(xml.contains(" to continue"));
    }

    #[test]
    fn test_bullet_list_uses_numbering() {
        let xml = export_document_xml("- one\n- two\n");
        assert_eq!(
            xml.matches(&format!("<w:numId w:val=\"{BULLET_NUM_ID}\"/>")).count(),
            2
        );
    }

    #[test]
    fn test_ordered_lists_do_not_share_counters() {
        let input = "1. a\n2. b\n\ntext\n\n1. c\n";
        let resume = Resume::parse(input).unwrap();
        let exporter = DocxExporter::new(&template("ats_classic"));
        let mut out = Cursor::new(Vec::new());
        exporter.export(&resume, &mut out).unwrap();
        let numbering = read_part(out, "word/numbering.xml");
        // Two ordered lists, two numbering instances.
        assert!(numbering.contains("<w:num w:numId=\"2\">"));
        assert!(numbering.contains("<w:num w:numId=\"3\">"));
    }

    #[test]
    fn test_ordered_start_is_honored() {
        let input = "3. third\n4. fourth\n";
        let resume = Resume::parse(input).unwrap();
        let exporter = DocxExporter::new(&template("ats_classic"));
        let mut out = Cursor::new(Vec::new());
        exporter.export(&resume, &mut out).unwrap();
        let numbering = read_part(out, "word/numbering.xml");
        assert!(numbering.contains("<w:startOverride w:val=\"3\"/>"));
    }

    #[test]
    fn test_strong_and_emphasis_runs() {
        let xml = export_document_xml("**bold** and *italic*\n");
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains("<w:i/>"));
    }

    #[test]
    fn test_heading_uses_heading_font() {
        let xml = export_document_xml("# Experience\n");
        assert!(xml.contains("w:ascii=\"Arial\""));
        assert!(xml.contains("<w:sz w:val=\"28\"/>"));
    }

    #[test]
    fn test_headings_reference_named_styles() {
        let resume = Resume::parse("# One\n\n## Two\n\n#### Deep\n").unwrap();
        let exporter = DocxExporter::new(&template("ats_classic"));
        let mut out = Cursor::new(Vec::new());
        exporter.export(&resume, &mut out).unwrap();
        let mut archive = zip::ZipArchive::new(out).unwrap();
        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(document.contains("<w:pStyle w:val=\"Heading1\"/>"));
        assert!(document.contains("<w:pStyle w:val=\"Heading2\"/>"));
        // h4 and deeper collapse onto Heading3.
        assert!(document.contains("<w:pStyle w:val=\"Heading3\"/>"));
        let mut styles = String::new();
        archive
            .by_name("word/styles.xml")
            .unwrap()
            .read_to_string(&mut styles)
            .unwrap();
        for id in ["Heading1", "Heading2", "Heading3"] {
            assert!(styles.contains(&format!("w:styleId=\"{id}\"")), "missing {id}");
        }
    }

    #[test]
    fn test_style_map_fallback() {
        let map = DocxStyleMap::for_template("no_such_template");
        assert_eq!(map.body_font, "Georgia");
    }

    #[test]
    fn test_package_has_required_parts() {
        let resume = Resume::parse("Body\n").unwrap();
        let exporter = DocxExporter::new(&template("ats_classic"));
        let mut out = Cursor::new(Vec::new());
        exporter.export(&resume, &mut out).unwrap();
        let mut archive = zip::ZipArchive::new(out).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/numbering.xml",
            "word/_rels/document.xml.rels",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing {name}");
        }
    }
}
