//! Error types for md2cv operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting a résumé.
///
/// Variants map onto the pipeline stages: input reading, frontmatter
/// parsing and template resolution are fatal for the whole run, while
/// `Render`, `Export` and `OutputWrite` are local to one export branch.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read input {path}: {source}")]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("input {0} is not valid UTF-8 text")]
    InputEncoding(PathBuf),

    #[error("invalid frontmatter at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("template '{name}' not found{}", available_hint(.available))]
    TemplateNotFound { name: String, available: Vec<String> },

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("DOCX export failed: {0}")]
    Export(String),

    #[error("cannot write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is local to a single export branch.
    ///
    /// Branch-local errors must not prevent sibling formats from being
    /// written; everything else aborts the run.
    pub fn is_branch_local(&self) -> bool {
        matches!(
            self,
            Error::Render(_) | Error::Export(_) | Error::OutputWrite { .. }
        )
    }
}

fn available_hint(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(" (available: {})", available.join(", "))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_not_found_lists_alternatives() {
        let err = Error::TemplateNotFound {
            name: "fancy".to_string(),
            available: vec!["ats_classic".to_string(), "modern".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'fancy'"));
        assert!(msg.contains("ats_classic, modern"));
    }

    #[test]
    fn test_branch_locality() {
        assert!(Error::Render("bad css".into()).is_branch_local());
        assert!(Error::Export("bad zip".into()).is_branch_local());
        assert!(
            !Error::Parse {
                line: 3,
                message: "oops".into()
            }
            .is_branch_local()
        );
    }
}
