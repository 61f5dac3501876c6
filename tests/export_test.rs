//! Export branch tests against the real output bytes: the PDF text
//! layer and the DOCX document part.

use std::io::{Cursor, Read};
use std::path::PathBuf;

use md2cv::export::{DocxExporter, Exporter, PdfExporter};
use md2cv::{Resume, Template, compose};

fn template() -> Template {
    Template {
        name: "ats_classic".to_string(),
        dir: PathBuf::new(),
        skeleton: "<html><body>{{ content }}</body></html>".to_string(),
        stylesheet: "body { font-family: Georgia, serif; font-size: 11pt; }\nh1 { font-size: 14pt; }"
            .to_string(),
    }
}

fn pdf_text_with(input: &str, raw_html: bool) -> String {
    let resume = Resume::parse(input).unwrap();
    let composed = compose(&resume, &template(), raw_html);
    let exporter = PdfExporter::new(&template());
    let mut out = Cursor::new(Vec::new());
    exporter.export(&composed, &mut out).unwrap();
    pdf_extract::extract_text_from_mem(&out.into_inner()).unwrap()
}

fn pdf_text(input: &str) -> String {
    pdf_text_with(input, false)
}

fn docx_document_xml(input: &str) -> String {
    let resume = Resume::parse(input).unwrap();
    let exporter = DocxExporter::new(&template());
    let mut out = Cursor::new(Vec::new());
    exporter.export(&resume, &mut out).unwrap();
    let mut archive = zip::ZipArchive::new(out).unwrap();
    let mut file = archive.by_name("word/document.xml").unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

#[test]
fn test_pdf_text_layer_contains_header_and_body() {
    let text = pdf_text(
        "---\nname: Jane Doe\ntitle: Staff Engineer\nemail: jane@example.com\n---\n# Experience\n\nBuilt conversion pipelines.\n",
    );
    assert!(text.contains("Jane Doe"));
    assert!(text.contains("Staff Engineer"));
    assert!(text.contains("Experience"));
    assert!(text.contains("conversion"));
}

#[test]
fn test_pdf_absent_fields_leave_no_separators() {
    // Only one contact field present: the text layer must not contain
    // a stray field separator anywhere.
    let text = pdf_text("---\nname: Jane\nemail: jane@example.com\n---\nBody text.\n");
    assert!(text.contains("jane@example.com"));
    assert!(!text.contains('|'));
}

#[test]
fn test_pdf_joins_present_fields_in_order() {
    let text = pdf_text(
        "---\nname: Jane\nemail: jane@example.com\nphone: 555-0100\nlocation: Lisbon\n---\nBody.\n",
    );
    let email = text.find("jane@example.com").unwrap();
    let phone = text.find("555-0100").unwrap();
    let location = text.find("Lisbon").unwrap();
    assert!(email < phone && phone < location);
}

#[test]
fn test_pdf_list_items_carry_markers() {
    let text = pdf_text("- first point\n- second point\n");
    assert!(text.contains('\u{2022}'));
    assert!(text.contains("first point"));
    assert!(text.contains("second point"));
}

#[test]
fn test_docx_document_contains_body_text() {
    let xml = docx_document_xml("# Skills\n\nRust, Python, and SQL.\n");
    assert!(xml.contains("Skills"));
    assert!(xml.contains("Rust, Python, and SQL."));
}

#[test]
fn test_docx_absent_fields_leave_no_separators() {
    let xml = docx_document_xml("---\nname: Jane\ngithub: gh.example/jane\n---\nBody.\n");
    assert!(xml.contains("gh.example/jane"));
    assert!(!xml.contains('|'));
}

#[test]
fn test_pdf_html_handling_follows_passthrough_flag() {
    let input = "<div class=\"sidebar\">Side content</div>\n";
    // Passthrough: the markup dissolves but its text survives.
    let raw = pdf_text_with(input, true);
    assert!(raw.contains("Side content"));
    assert!(!raw.contains("<div"));
    // Default: the markup is shown literally, matching the escaped
    // HTML output.
    let escaped = pdf_text_with(input, false);
    assert!(escaped.contains("<div"));
    assert!(escaped.contains("Side content"));
}

#[test]
fn test_both_branches_share_one_parse() {
    // The same inline emphasis must appear in both outputs.
    let input = "Shipped **major** releases.\n";
    let text = pdf_text(input);
    assert!(text.contains("major"));
    let xml = docx_document_xml(input);
    assert!(xml.contains("<w:b/>"));
    assert!(xml.contains(">major<"));
}
