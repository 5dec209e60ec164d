//! PDF loading, single-file persistence, and batch conversion.
//!
//! Every output file lands in a `textdata` folder next to its input PDF.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{first_set, parse_bool, ConfigError, Lookup, Settings};
use crate::ocr::{ExtractedText, TextExtractor};

/// Name of the folder extracted text is written into.
pub const TEXTDATA_DIR: &str = "textdata";

/// Errors that abort a load, save, or batch call.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("PDF file not found: {0}")]
    NotFound(PathBuf),

    #[error("File is not a PDF: {0}")]
    NotPdf(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> LoadError + '_ {
        move |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Batch discovery options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Match `.PDF`, `.Pdf`, ... as well as `.pdf`
    #[serde(default)]
    pub case_insensitive: bool,
}

impl BatchConfig {
    /// Apply the `BATCH_CASE_INSENSITIVE` override.
    pub fn with_overrides(mut self, lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        if let Some((var, val)) = first_set(lookup, &["BATCH_CASE_INSENSITIVE"]) {
            self.case_insensitive = parse_bool(var, &val)?;
        }
        Ok(self)
    }
}

/// Outcome of converting one directory.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output files written, in processing order.
    pub converted: Vec<PathBuf>,
    /// Inputs that failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    /// Number of PDFs the batch tried to convert.
    pub fn attempted(&self) -> usize {
        self.converted.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The `textdata` folder for a PDF: a sibling of the file.
pub fn textdata_folder(pdf_path: &Path) -> PathBuf {
    pdf_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(TEXTDATA_DIR)
}

/// Default output file name: the PDF's name with a `.txt` extension.
fn text_file_name(pdf_path: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    let mut name = PathBuf::from(stem);
    name.set_extension("txt");
    name
}

/// Resolve where extracted text for `pdf_path` is written.
///
/// The result is always directly inside [`textdata_folder`]. A requested
/// path elsewhere keeps only its file name.
pub fn resolve_output_path(pdf_path: &Path, requested: Option<&Path>) -> PathBuf {
    let folder = textdata_folder(pdf_path);
    match requested {
        None => folder.join(text_file_name(pdf_path)),
        Some(path) if path.parent() == Some(folder.as_path()) => path.to_path_buf(),
        Some(path) => match path.file_name() {
            Some(name) => folder.join(name),
            None => folder.join(text_file_name(pdf_path)),
        },
    }
}

/// Check that `pdf_path` exists and carries a `.pdf` extension (any case).
pub fn validate_pdf_path(pdf_path: &Path) -> Result<(), LoadError> {
    if !pdf_path.exists() {
        return Err(LoadError::NotFound(pdf_path.to_path_buf()));
    }
    let is_pdf = pdf_path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(LoadError::NotPdf(pdf_path.to_path_buf()));
    }
    Ok(())
}

/// Loads PDFs through a [`TextExtractor`] and writes the results to disk.
pub struct PdfLoader {
    extractor: TextExtractor,
    batch: BatchConfig,
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new(TextExtractor::default())
    }
}

impl PdfLoader {
    pub fn new(extractor: TextExtractor) -> Self {
        Self {
            extractor,
            batch: BatchConfig::default(),
        }
    }

    /// Build a Poppler/Tesseract-backed loader from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(TextExtractor::new(settings.ocr.clone())).with_batch_config(settings.batch.clone())
    }

    pub fn with_batch_config(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    /// Extract a PDF, keeping page structure and the method used.
    ///
    /// Tries the text layer first and falls back to OCR only when the text
    /// layer yields nothing but whitespace.
    pub fn load_document(&self, pdf_path: &Path) -> Result<ExtractedText, LoadError> {
        validate_pdf_path(pdf_path)?;
        info!("Loading PDF: {}", pdf_path.display());

        let doc = self.extractor.extract_text_layer(pdf_path);
        if !doc.text().trim().is_empty() {
            return Ok(doc);
        }

        info!("No text found, attempting OCR extraction");
        Ok(self.extractor.extract_with_ocr(pdf_path))
    }

    /// Extract a PDF to a single page-delimited string.
    pub fn load_pdf(&self, pdf_path: &Path) -> Result<String, LoadError> {
        self.load_document(pdf_path).map(|doc| doc.text())
    }

    /// Extract a PDF and write the text into its `textdata` folder.
    ///
    /// Returns the path written. See [`resolve_output_path`] for how a
    /// requested output path is handled.
    pub fn save_as_text(
        &self,
        pdf_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<PathBuf, LoadError> {
        validate_pdf_path(pdf_path)?;

        let folder = textdata_folder(pdf_path);
        fs::create_dir_all(&folder).map_err(LoadError::io(&folder))?;

        let resolved = resolve_output_path(pdf_path, output_path);
        if let Some(requested) = output_path {
            if requested != resolved {
                warn!(
                    "Output path {} is outside {}; writing to {} instead",
                    requested.display(),
                    folder.display(),
                    resolved.display()
                );
            }
        }

        let doc = self.load_document(pdf_path)?;
        fs::write(&resolved, doc.text().as_bytes()).map_err(LoadError::io(&resolved))?;

        info!("Text saved to: {} (via {})", resolved.display(), doc.method());
        Ok(resolved)
    }

    /// PDFs directly inside `dir`, in directory-listing order.
    pub fn discover_pdfs(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let case_insensitive = self.batch.case_insensitive;
        let entries = fs::read_dir(dir).map_err(LoadError::io(dir))?;

        Ok(entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|p| p.is_file())
            .filter(|p| match p.extension().and_then(|ext| ext.to_str()) {
                Some(ext) if case_insensitive => ext.eq_ignore_ascii_case("pdf"),
                Some(ext) => ext == "pdf",
                None => false,
            })
            .collect())
    }

    /// Convert every PDF directly inside `pdf_folder`.
    ///
    /// Output always goes to `pdf_folder/textdata`; `output_folder` is only
    /// honored if it names that same folder. A failing file is logged,
    /// recorded in the report, and does not stop the batch.
    pub fn batch_convert(
        &self,
        pdf_folder: &Path,
        output_folder: Option<&Path>,
    ) -> Result<BatchReport, LoadError> {
        if !pdf_folder.is_dir() {
            return Err(LoadError::NotADirectory(pdf_folder.to_path_buf()));
        }

        let textdata = pdf_folder.join(TEXTDATA_DIR);
        if let Some(requested) = output_folder {
            if requested != textdata {
                warn!(
                    "Ignoring output folder {}; batch output always goes to {}",
                    requested.display(),
                    textdata.display()
                );
            }
        }
        fs::create_dir_all(&textdata).map_err(LoadError::io(&textdata))?;

        let pdf_files = self.discover_pdfs(pdf_folder)?;
        info!("Found {} PDF files to process", pdf_files.len());

        let mut report = BatchReport::default();
        let total = pdf_files.len();
        for (i, pdf_file) in pdf_files.into_iter().enumerate() {
            let name = pdf_file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            info!("Processing {}/{}: {}", i + 1, total, name);

            let target = textdata.join(text_file_name(&pdf_file));
            match self.save_as_text(&pdf_file, Some(&target)) {
                Ok(path) => report.converted.push(path),
                Err(e) => {
                    error!("Failed to convert {}: {}", name, e);
                    report.failed.push((pdf_file, e.to_string()));
                }
            }
        }

        info!("Successfully converted {} files", report.converted.len());
        Ok(report)
    }
}
