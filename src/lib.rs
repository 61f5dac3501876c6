//! # md2cv
//!
//! Convert a Markdown résumé with YAML frontmatter into styled PDF and
//! DOCX documents through HTML/CSS templates.
//!
//! ## Features
//!
//! - YAML frontmatter for contact details and links
//! - One shared Markdown parse feeding every output format
//! - Directory-based templates (HTML skeleton plus stylesheet)
//! - Independent PDF and DOCX export branches with atomic file writes
//!
//! ## Quick Start
//!
//! ```no_run
//! use md2cv::{Conversion, Format};
//!
//! let conversion = Conversion {
//!     input: "cv.md".into(),
//!     template: None,
//!     templates_dir: "templates".into(),
//!     output_dir: "output".into(),
//!     raw_html: false,
//! };
//! let outcomes = conversion.run(&[Format::Pdf, Format::Docx]).unwrap();
//! for outcome in &outcomes {
//!     if outcome.is_ok() {
//!         println!("{} created: {}", outcome.format.label(), outcome.path.display());
//!     }
//! }
//! ```
//!
//! ## Working with Parsed Résumés
//!
//! [`Resume`] is the central data type: frontmatter fields plus the
//! canonical block structure of the body.
//!
//! ```
//! use md2cv::Resume;
//!
//! let resume = Resume::parse("---\nname: Jane Doe\nemail: jane@example.com\n---\n# Summary\n").unwrap();
//! assert_eq!(resume.metadata.get("name"), Some("Jane Doe"));
//! assert_eq!(resume.blocks.len(), 1);
//! ```

pub mod body;
pub mod compose;
pub mod convert;
pub mod css;
pub mod error;
pub mod export;
pub mod frontmatter;
pub mod html;
pub mod resume;
pub mod template;

pub use compose::{ComposedDocument, compose};
pub use convert::{Conversion, Format, FormatOutcome};
pub use error::{Error, Result};
pub use frontmatter::Metadata;
pub use resume::Resume;
pub use template::{DEFAULT_TEMPLATE, Template, list_templates};
