//! Export branches for writing the résumé to output formats.
//!
//! Each exporter is independent: a failure in one branch must not
//! prevent a sibling format from being written. Exporters hold their
//! configuration and write to any `Write + Seek` destination.

use std::io::{Seek, Write};

use crate::error::Result;
use crate::frontmatter::Metadata;

mod docx;
mod pdf;

pub use docx::{DocxExporter, DocxStyleMap};
pub use pdf::PdfExporter;

/// Trait shared by the format exporters.
pub trait Exporter {
    /// Input type: the PDF branch consumes the composed document, the
    /// DOCX branch the parsed résumé.
    type Source;

    /// File extension for output naming (`pdf`, `docx`).
    fn extension(&self) -> &'static str;

    /// Export to the provided writer.
    fn export<W: Write + Seek>(&self, source: &Self::Source, writer: &mut W) -> Result<()>;
}

/// Contact fields rendered on one line, in display order.
pub const CONTACT_FIELDS: &[&str] = &["email", "phone", "location"];

/// Link fields rendered on one line, in display order.
pub const LINK_FIELDS: &[&str] = &["linkedin", "github", "website"];

/// Join the present fields with ` | `, or `None` when all are absent.
///
/// Absent fields are omitted entirely, never rendered as blank slots
/// between separators.
pub(crate) fn field_line(metadata: &Metadata, fields: &[&str]) -> Option<String> {
    let parts: Vec<&str> = fields.iter().filter_map(|key| metadata.get(key)).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

/// Strip tags from raw HTML, keeping its text content.
///
/// Neither export branch has an HTML layout engine, so raw markup
/// degrades to its visible text instead of vanishing.
pub(crate) fn html_text(html: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_text_strips_tags() {
        assert_eq!(html_text("<div class=\"x\">a <b>b</b></div>"), "a b");
    }

    #[test]
    fn test_field_line_skips_absent() {
        let mut meta = Metadata::new();
        meta.set("email", "jane@example.com");
        meta.set("location", "Lisbon");
        assert_eq!(
            field_line(&meta, CONTACT_FIELDS),
            Some("jane@example.com | Lisbon".to_string())
        );
    }

    #[test]
    fn test_field_line_all_absent() {
        assert_eq!(field_line(&Metadata::new(), LINK_FIELDS), None);
    }
}
