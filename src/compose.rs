//! Document composition: binding metadata and rendered content into a
//! template skeleton.
//!
//! The skeleton carries named slots written as `{{ slot }}`. Every
//! metadata field substitutes HTML-escaped into its slot; a slot whose
//! field is absent renders as an empty string, never as a placeholder
//! token — that is what lets authors omit optional contact fields. Two
//! slots are special: `content` receives the rendered body fragment
//! verbatim, and `styles` inlines the template stylesheet.

use crate::body::Block;
use crate::frontmatter::Metadata;
use crate::html::{self, escape_html};
use crate::resume::Resume;
use crate::template::Template;

/// The fully composed document handed to the PDF export branch.
///
/// Transient: produced once per conversion and dropped when the export
/// branches finish. Carries the canonical block structure alongside the
/// HTML so the PDF renderer consumes the same body representation as
/// the DOCX branch.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    /// The complete HTML page.
    pub html: String,
    /// The template stylesheet driving PDF pagination.
    pub stylesheet: String,
    pub metadata: Metadata,
    pub blocks: Vec<Block>,
    /// Whether HTML blocks pass through verbatim; the PDF branch reads
    /// this so its treatment of markup matches the composed HTML.
    pub raw_html: bool,
}

/// Compose a résumé into a template.
pub fn compose(resume: &Resume, template: &Template, raw_html: bool) -> ComposedDocument {
    let body_html = html::render(&resume.blocks, raw_html);
    let html = substitute(
        &template.skeleton,
        &resume.metadata,
        &body_html,
        &template.stylesheet,
    );
    ComposedDocument {
        html,
        stylesheet: template.stylesheet.clone(),
        metadata: resume.metadata.clone(),
        blocks: resume.blocks.clone(),
        raw_html,
    }
}

/// Replace `{{ slot }}` placeholders in the skeleton.
///
/// Unterminated `{{` sequences are emitted literally rather than
/// treated as errors; template authors see their typo in the output.
fn substitute(skeleton: &str, metadata: &Metadata, content: &str, styles: &str) -> String {
    let mut out = String::with_capacity(skeleton.len() + content.len());
    let mut rest = skeleton;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let slot = after[..close].trim();
                match slot {
                    "content" => out.push_str(content),
                    "styles" => out.push_str(styles),
                    key => {
                        if let Some(value) = metadata.get(key) {
                            out.push_str(&escape_html(value));
                        }
                    }
                }
                rest = &after[close + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn template_with(skeleton: &str) -> Template {
        Template {
            name: "test".to_string(),
            dir: PathBuf::new(),
            skeleton: skeleton.to_string(),
            stylesheet: "body { color: black; }".to_string(),
        }
    }

    fn resume_with(input: &str) -> Resume {
        Resume::parse(input).unwrap()
    }

    #[test]
    fn test_metadata_substitution_escaped() {
        let resume = resume_with("---\nname: \"Jane & Co\"\n---\nbody\n");
        let template = template_with("<h1>{{ name }}</h1>\n<main>{{ content }}</main>");
        let doc = compose(&resume, &template, false);
        assert!(doc.html.contains("<h1>Jane &amp; Co</h1>"));
        assert!(doc.html.contains("<main><p>body</p>"));
    }

    #[test]
    fn test_absent_field_renders_empty() {
        let resume = resume_with("---\nname: Jane\n---\nbody\n");
        let template = template_with("<span>{{ website }}</span>");
        let doc = compose(&resume, &template, false);
        assert!(doc.html.contains("<span></span>"));
        assert!(!doc.html.contains("website"));
    }

    #[test]
    fn test_slot_whitespace_tolerance() {
        let resume = resume_with("---\nname: Jane\n---\n");
        let template = template_with("{{name}}|{{ name }}|{{  name  }}");
        let doc = compose(&resume, &template, false);
        assert_eq!(doc.html, "Jane|Jane|Jane");
    }

    #[test]
    fn test_styles_inlined() {
        let resume = resume_with("body\n");
        let template = template_with("<style>{{ styles }}</style>");
        let doc = compose(&resume, &template, false);
        assert!(doc.html.contains("body { color: black; }"));
    }

    #[test]
    fn test_content_verbatim() {
        // The content slot must not be double-escaped.
        let resume = resume_with("**bold**\n");
        let template = template_with("{{ content }}");
        let doc = compose(&resume, &template, false);
        assert!(doc.html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_unterminated_slot_is_literal() {
        let resume = resume_with("body\n");
        let template = template_with("oops {{ name");
        let doc = compose(&resume, &template, false);
        assert_eq!(doc.html, "oops {{ name");
    }
}
