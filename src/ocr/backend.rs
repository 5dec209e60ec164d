//! OCR backend abstraction.
//!
//! The OCR fallback needs two collaborators: something that turns a PDF into
//! one image per page, and something that turns an image into text. Both are
//! traits so the extractor can run against the Poppler/Tesseract tools in
//! production and against fakes in tests.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{first_set, parse_value, ConfigError, Lookup};

/// Rasterization resolution used for OCR input images.
pub const DEFAULT_DPI: u32 = 300;

/// Errors from OCR backends and rasterizers.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for OCR engines.
pub trait OcrBackend: Send + Sync {
    /// Short backend name for logs and status output.
    fn name(&self) -> &'static str;

    /// Check if this backend is available (dependencies installed).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Extract text from an image file.
    fn run_ocr(&self, image_path: &Path) -> Result<String, OcrError>;
}

/// Trait for turning a PDF into page images.
pub trait PageRasterizer: Send + Sync {
    /// Render every page of `pdf_path` into `output_dir` at `dpi`.
    ///
    /// Returns image paths in page order.
    fn rasterize(&self, pdf_path: &Path, dpi: u32, output_dir: &Path)
        -> Result<Vec<PathBuf>, OcrError>;
}

/// Configuration for the OCR fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Language for OCR (e.g., "eng", "deu", "chi_sim").
    #[serde(default = "default_language")]
    pub language: String,
    /// Rasterization resolution for OCR input images.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_dpi() -> u32 {
    DEFAULT_DPI
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            dpi: default_dpi(),
        }
    }
}

impl OcrConfig {
    /// Apply overrides from `OCR_LANGUAGE` and `OCR_DPI`.
    pub fn with_overrides(mut self, lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        if let Some((_, language)) = first_set(lookup, &["OCR_LANGUAGE"]) {
            self.language = language.trim().to_string();
        }
        if let Some((var, val)) = first_set(lookup, &["OCR_DPI"]) {
            let dpi: u32 = parse_value(var, &val)?;
            if dpi == 0 {
                return Err(ConfigError::InvalidValue {
                    key: var.to_string(),
                    value: val,
                    reason: "must be positive".to_string(),
                });
            }
            self.dpi = dpi;
        }
        Ok(self)
    }

    /// Set OCR language.
    pub fn with_language(mut self, lang: &str) -> Self {
        self.language = lang.to_string();
        self
    }
}
