//! Conversion driver.
//!
//! Runs the shared pipeline stages once (read, parse, resolve the
//! template, compose) and then each requested export branch
//! independently. A branch failure is reported in its outcome and
//! never prevents a sibling format from being written.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::compose;
use crate::error::{Error, Result};
use crate::export::{DocxExporter, Exporter, PdfExporter};
use crate::resume::Resume;
use crate::template::Template;

/// Output formats, requested per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pdf,
    Docx,
}

impl Format {
    /// Display name used in progress output.
    pub fn label(self) -> &'static str {
        match self {
            Format::Pdf => "PDF",
            Format::Docx => "DOCX",
        }
    }
}

/// Result of one export branch.
#[derive(Debug)]
pub struct FormatOutcome {
    pub format: Format,
    /// Final output path, whether or not the branch succeeded.
    pub path: PathBuf,
    pub result: Result<()>,
}

impl FormatOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// One conversion run: input file, template selection and output
/// placement.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub input: PathBuf,
    /// Template name; `None` selects the default template.
    pub template: Option<String>,
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Pass raw HTML through to composed output instead of escaping.
    pub raw_html: bool,
}

impl Conversion {
    /// Run the requested formats.
    ///
    /// Errors in the shared stages (input, frontmatter, template) abort
    /// the whole run with `Err`; errors inside one export branch are
    /// captured in that branch's [`FormatOutcome`] instead.
    pub fn run(&self, formats: &[Format]) -> Result<Vec<FormatOutcome>> {
        let resume = Resume::from_file(&self.input)?;
        let template = Template::resolve(&self.templates_dir, self.template.as_deref())?;
        let composed = compose::compose(&resume, &template, self.raw_html);

        fs::create_dir_all(&self.output_dir).map_err(|source| Error::OutputWrite {
            path: self.output_dir.clone(),
            source,
        })?;
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "resume".into());

        let mut outcomes = Vec::with_capacity(formats.len());
        for &format in formats {
            // The exporter owns its file extension, so output naming
            // stays next to the code that writes the bytes.
            let (path, result) = match format {
                Format::Pdf => {
                    let exporter = PdfExporter::new(&template);
                    let path = self.output_path(&stem, exporter.extension());
                    let result = write_atomic(&path, |w| exporter.export(&composed, w));
                    (path, result)
                }
                Format::Docx => {
                    let exporter = DocxExporter::new(&template);
                    let path = self.output_path(&stem, exporter.extension());
                    let result = write_atomic(&path, |w| exporter.export(&resume, w));
                    (path, result)
                }
            };
            outcomes.push(FormatOutcome {
                format,
                path,
                result,
            });
        }
        Ok(outcomes)
    }

    fn output_path(&self, stem: &std::ffi::OsStr, extension: &str) -> PathBuf {
        let mut path = self.output_dir.join(stem);
        path.set_extension(extension);
        path
    }
}

/// Write through a temp file in the destination directory, renaming
/// into place only after the exporter finished. A failed branch never
/// leaves a truncated output file behind.
fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp =
        NamedTempFile::new_in(dir.unwrap_or(Path::new("."))).map_err(|source| Error::OutputWrite {
            path: path.to_path_buf(),
            source,
        })?;
    write(&mut tmp)?;
    tmp.persist(path).map_err(|e| Error::OutputWrite {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_template(root: &Path, name: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("template.html"),
            "<html><head><style>{{ styles }}</style></head><body>{{ content }}</body></html>",
        )
        .unwrap();
        fs::write(dir.join("style.css"), "body { font-size: 11pt; }").unwrap();
    }

    fn conversion(root: &TempDir) -> Conversion {
        let input = root.path().join("cv.md");
        fs::write(&input, "---\nname: Jane\n---\n# Summary\nHello\n").unwrap();
        write_template(&root.path().join("templates"), "ats_classic");
        Conversion {
            input,
            template: None,
            templates_dir: root.path().join("templates"),
            output_dir: root.path().join("output"),
            raw_html: false,
        }
    }

    #[test]
    fn test_run_writes_both_formats() {
        let root = TempDir::new().unwrap();
        let conv = conversion(&root);
        let outcomes = conv.run(&[Format::Pdf, Format::Docx]).unwrap();
        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            assert!(outcome.is_ok(), "{:?} failed", outcome.format);
            assert!(outcome.path.exists());
        }
        assert!(root.path().join("output/cv.pdf").exists());
        assert!(root.path().join("output/cv.docx").exists());
    }

    #[test]
    fn test_unknown_template_is_fatal() {
        let root = TempDir::new().unwrap();
        let mut conv = conversion(&root);
        conv.template = Some("fancy".to_string());
        let err = conv.run(&[Format::Pdf]).unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { .. }));
    }

    #[test]
    fn test_branch_failure_is_isolated() {
        let root = TempDir::new().unwrap();
        let conv = conversion(&root);
        // A directory squatting on the target path makes the rename
        // fail for the DOCX branch only.
        fs::create_dir_all(root.path().join("output/cv.docx")).unwrap();
        let outcomes = conv.run(&[Format::Pdf, Format::Docx]).unwrap();
        assert!(outcomes[0].is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(Error::OutputWrite { .. })
        ));
        assert!(root.path().join("output/cv.pdf").exists());
    }

    #[test]
    fn test_failed_branch_leaves_no_partial_file() {
        let root = TempDir::new().unwrap();
        let mut conv = conversion(&root);
        conv.input = root.path().join("missing.md");
        assert!(conv.run(&[Format::Pdf]).is_err());
        assert!(!root.path().join("output/missing.pdf").exists());
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(Format::Pdf.label(), "PDF");
        assert_eq!(Format::Docx.label(), "DOCX");
    }

    #[test]
    fn test_output_named_by_exporter_extension() {
        let root = TempDir::new().unwrap();
        let conv = conversion(&root);
        let outcomes = conv.run(&[Format::Pdf, Format::Docx]).unwrap();
        let extensions: Vec<_> = outcomes
            .iter()
            .map(|o| o.path.extension().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(extensions, ["pdf", "docx"]);
    }
}
