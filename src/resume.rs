//! The parsed résumé: metadata plus canonical body structure.

use std::fs;
use std::path::Path;

use crate::body::{self, Block};
use crate::error::{Error, Result};
use crate::frontmatter::{self, Metadata};

/// A résumé document parsed once from input text.
///
/// Both export branches observe this same structure; nothing here is
/// mutated after parsing.
#[derive(Debug, Clone)]
pub struct Resume {
    pub metadata: Metadata,
    pub blocks: Vec<Block>,
    /// The raw body text the blocks were parsed from.
    pub body: String,
}

impl Resume {
    /// Parse input text: frontmatter first, then one body parse shared
    /// by every consumer.
    pub fn parse(input: &str) -> Result<Resume> {
        let (metadata, body) = frontmatter::extract(input)?;
        let blocks = body::parse_blocks(body);
        Ok(Resume {
            metadata,
            blocks,
            body: body.to_string(),
        })
    }

    /// Read and parse an input file.
    ///
    /// Missing or unreadable files fail with [`Error::Input`]; files
    /// that are not UTF-8 text fail with [`Error::InputEncoding`].
    pub fn from_file(path: &Path) -> Result<Resume> {
        let bytes = fs::read(path).map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes)
            .map_err(|_| Error::InputEncoding(path.to_path_buf()))?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let resume = Resume::parse("---\nname: Jane\n---\n# Summary\nHello\n").unwrap();
        assert_eq!(resume.metadata.get("name"), Some("Jane"));
        assert_eq!(resume.blocks.len(), 2);
        assert!(resume.body.starts_with("# Summary"));
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let err = Resume::from_file(Path::new("/nonexistent/cv.md")).unwrap_err();
        assert!(matches!(err, Error::Input { .. }));
    }
}
