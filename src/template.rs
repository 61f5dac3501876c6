//! Template resolution and listing.
//!
//! A template is a directory under the template root containing exactly
//! two assets: an HTML skeleton with `{{ slot }}` placeholders and a
//! stylesheet. Assets are loaded fresh on every invocation; nothing is
//! cached across runs.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the template used when none is requested.
pub const DEFAULT_TEMPLATE: &str = "ats_classic";

/// Skeleton file expected inside every template directory.
pub const SKELETON_FILE: &str = "template.html";

/// Stylesheet file expected inside every template directory.
pub const STYLESHEET_FILE: &str = "style.css";

/// A resolved template with both assets loaded.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub dir: PathBuf,
    /// The HTML skeleton with substitution slots.
    pub skeleton: String,
    /// The CSS applied during PDF pagination.
    pub stylesheet: String,
}

impl Template {
    /// Resolve a template by name under the given root, falling back to
    /// [`DEFAULT_TEMPLATE`] when no name is given.
    ///
    /// Fails with [`Error::TemplateNotFound`] when the directory or
    /// either required file is missing. The error carries the list of
    /// templates that would have been valid.
    pub fn resolve(root: &Path, name: Option<&str>) -> Result<Template> {
        let name = name.unwrap_or(DEFAULT_TEMPLATE);
        let dir = root.join(name);
        let skeleton_path = dir.join(SKELETON_FILE);
        let stylesheet_path = dir.join(STYLESHEET_FILE);

        if !skeleton_path.is_file() || !stylesheet_path.is_file() {
            return Err(Error::TemplateNotFound {
                name: name.to_string(),
                available: list_templates(root),
            });
        }

        let skeleton = fs::read_to_string(&skeleton_path)?;
        let stylesheet = fs::read_to_string(&stylesheet_path)?;

        Ok(Template {
            name: name.to_string(),
            dir,
            skeleton,
            stylesheet,
        })
    }
}

/// List the names of valid templates under the root, sorted.
///
/// A subdirectory qualifies only if both required files are present.
/// A missing or empty root yields an empty list, never an error.
pub fn list_templates(root: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| {
            let dir = entry.path();
            dir.is_dir() && dir.join(SKELETON_FILE).is_file() && dir.join(STYLESHEET_FILE).is_file()
        })
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}
