//! Frontmatter extraction and composition.
//!
//! A résumé document may start with a metadata block delimited by `---`
//! marker lines:
//!
//! ```text
//! ---
//! name: "Jane Doe"
//! email: jane@example.com
//! ---
//! # Summary
//! ```
//!
//! [`extract`] splits such a document into a [`Metadata`] record and the
//! remaining body text. A document without a leading marker is all body;
//! that is never an error. A block that is opened but malformed (missing
//! closing marker, invalid mapping syntax, non-scalar values) fails with
//! [`Error::Parse`] naming the offending line.
//!
//! [`compose`] is the inverse operation: it serializes a metadata record
//! back into a delimited block followed by the body.

use std::collections::BTreeMap;

use memchr::memchr;

use crate::error::{Error, Result};

/// Résumé metadata parsed from the frontmatter block.
///
/// A mapping from keys (`name`, `title`, `email`, `phone`, `location`,
/// `linkedin`, `github`, `website`, and any others the document carries)
/// to string values. No key is required; absent keys render as empty
/// downstream. Immutable once parsed for the duration of one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    fields: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Set a field value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Split input text into a metadata record and the remaining body.
///
/// The frontmatter block must start at the very first byte of the input.
/// Anything else, including a `---` further down the document, is body.
pub fn extract(input: &str) -> Result<(Metadata, &str)> {
    if !is_marker_line(first_line(input)) {
        return Ok((Metadata::default(), input));
    }

    let bytes = input.as_bytes();
    let yaml_start = match memchr(b'\n', bytes) {
        Some(idx) => idx + 1,
        // Lone "---" with no newline: an opened block that never closes.
        None => return Err(unterminated()),
    };

    // Scan line by line for the closing marker.
    let mut pos = yaml_start;
    while pos < input.len() {
        let line_end = memchr(b'\n', &bytes[pos..])
            .map(|i| pos + i)
            .unwrap_or(input.len());
        if is_marker_line(&input[pos..line_end]) {
            let yaml = &input[yaml_start..pos];
            let body = if line_end < input.len() {
                &input[line_end + 1..]
            } else {
                ""
            };
            return Ok((parse_mapping(yaml)?, body));
        }
        if line_end == input.len() {
            break;
        }
        pos = line_end + 1;
    }

    Err(unterminated())
}

/// Serialize a metadata record and body back into a single document.
///
/// Keys and values are written double-quoted so that [`extract`]
/// recovers them exactly; an unquoted key like `123` or `true` would
/// resolve as a non-string YAML scalar. An empty record produces the
/// body alone, with no markers.
pub fn compose(metadata: &Metadata, body: &str) -> String {
    if metadata.is_empty() {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len() + 16 * metadata.len() + 16);
    out.push_str("---\n");
    for (key, value) in metadata.iter() {
        push_quoted(&mut out, key);
        out.push_str(": ");
        push_quoted(&mut out, value);
        out.push('\n');
    }
    out.push_str("---\n");
    out.push_str(body);
    out
}

/// Append a double-quoted YAML scalar.
fn push_quoted(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

fn first_line(input: &str) -> &str {
    match memchr(b'\n', input.as_bytes()) {
        Some(idx) => &input[..idx],
        None => input,
    }
}

/// A marker line is `---` followed only by whitespace.
fn is_marker_line(line: &str) -> bool {
    line.trim_end_matches(['\r', ' ', '\t']) == "---"
}

fn unterminated() -> Error {
    Error::Parse {
        line: 1,
        message: "unterminated frontmatter block (missing closing ---)".to_string(),
    }
}

/// Parse the YAML between the markers into a flat string mapping.
///
/// Only scalar values are accepted. Null values (`website:` with nothing
/// after the colon) are treated as absent fields rather than empty strings.
fn parse_mapping(yaml: &str) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    if yaml.trim().is_empty() {
        return Ok(metadata);
    }

    let value: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(|e| {
        // serde_yaml reports locations relative to the block; the opening
        // marker occupies line 1 of the document.
        let line = e.location().map(|loc| loc.line() + 1).unwrap_or(2);
        Error::Parse {
            line,
            message: e.to_string(),
        }
    })?;

    let mapping = match value {
        serde_yaml::Value::Mapping(mapping) => mapping,
        serde_yaml::Value::Null => return Ok(metadata),
        _ => {
            return Err(Error::Parse {
                line: 2,
                message: "frontmatter must be a key: value mapping".to_string(),
            });
        }
    };

    for (key, value) in mapping {
        let key = match key {
            serde_yaml::Value::String(s) => s,
            other => {
                return Err(Error::Parse {
                    line: 2,
                    message: format!("frontmatter keys must be strings, got {:?}", other),
                });
            }
        };
        match value {
            serde_yaml::Value::String(s) => metadata.set(key, s),
            serde_yaml::Value::Number(n) => metadata.set(key, n.to_string()),
            serde_yaml::Value::Bool(b) => metadata.set(key, b.to_string()),
            serde_yaml::Value::Null => {}
            _ => {
                return Err(Error::Parse {
                    line: line_of_key(yaml, &key),
                    message: format!("value for '{key}' must be a string scalar"),
                });
            }
        }
    }

    Ok(metadata)
}

/// Best-effort document line number for a key inside the block.
fn line_of_key(yaml: &str, key: &str) -> usize {
    for (i, line) in yaml.lines().enumerate() {
        if line.trim_start().starts_with(key) {
            return i + 2;
        }
    }
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic() {
        let input = "---\nname: \"Jane\"\ntitle: Engineer\n---\n# Summary\nHello\n";
        let (meta, body) = extract(input).unwrap();
        assert_eq!(meta.get("name"), Some("Jane"));
        assert_eq!(meta.get("title"), Some("Engineer"));
        assert_eq!(body, "# Summary\nHello\n");
    }

    #[test]
    fn test_no_marker_is_all_body() {
        let input = "# Summary\nno frontmatter here\n";
        let (meta, body) = extract(input).unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, input);
    }

    #[test]
    fn test_marker_not_at_start_is_body() {
        let input = "\n---\nname: Jane\n---\nbody";
        let (meta, body) = extract(input).unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, input);
    }

    #[test]
    fn test_unterminated_block_fails() {
        let input = "---\nname: Jane\nno closing marker\n";
        let err = extract(input).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_lone_marker_fails() {
        assert!(extract("---").is_err());
        assert!(extract("---\n").is_err());
    }

    #[test]
    fn test_empty_block() {
        let (meta, body) = extract("---\n---\nbody\n").unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, "body\n");
    }

    #[test]
    fn test_marker_with_trailing_whitespace() {
        let (meta, body) = extract("---  \nname: Jane\n--- \t\nbody").unwrap();
        assert_eq!(meta.get("name"), Some("Jane"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_closing_marker_at_eof() {
        let (meta, body) = extract("---\nname: Jane\n---").unwrap();
        assert_eq!(meta.get("name"), Some("Jane"));
        assert_eq!(body, "");
    }

    #[test]
    fn test_scalar_coercion() {
        let (meta, _) = extract("---\nyears: 7\nremote: true\n---\n").unwrap();
        assert_eq!(meta.get("years"), Some("7"));
        assert_eq!(meta.get("remote"), Some("true"));
    }

    #[test]
    fn test_null_value_is_absent() {
        let (meta, _) = extract("---\nname: Jane\nwebsite:\n---\n").unwrap();
        assert_eq!(meta.get("name"), Some("Jane"));
        assert_eq!(meta.get("website"), None);
    }

    #[test]
    fn test_nested_value_fails_with_line() {
        let input = "---\nname: Jane\nlinks:\n  - one\n---\n";
        let err = extract(input).unwrap_err();
        match err {
            Error::Parse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("links"));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_yaml_fails() {
        let input = "---\nname: \"unclosed\n---\nbody";
        assert!(matches!(extract(input), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_compose_round_trip() {
        let mut meta = Metadata::new();
        meta.set("name", "Jane \"JJ\" Doe");
        meta.set("path", "C:\\home");
        let body = "# Summary\n\nHello world.\n";
        let document = compose(&meta, body);
        let (meta2, body2) = extract(&document).unwrap();
        assert_eq!(meta2, meta);
        assert_eq!(body2, body);
    }

    #[test]
    fn test_compose_quotes_scalar_looking_keys() {
        // Unquoted, YAML would resolve these keys as a number and a
        // bool and extraction would reject them.
        let mut meta = Metadata::new();
        meta.set("123", "numeric key");
        meta.set("true", "bool key");
        let document = compose(&meta, "body\n");
        let (meta2, body) = extract(&document).unwrap();
        assert_eq!(meta2.get("123"), Some("numeric key"));
        assert_eq!(meta2.get("true"), Some("bool key"));
        assert_eq!(body, "body\n");
    }

    #[test]
    fn test_compose_empty_metadata_is_bare_body() {
        let meta = Metadata::new();
        assert_eq!(compose(&meta, "just body"), "just body");
    }
}
