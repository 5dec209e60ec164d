//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line for text extraction.

use std::path::Path;
use std::process::Command;

use super::backend::{OcrBackend, OcrConfig, OcrError};
use super::tools::{check_binary, TESSERACT_HINT};

/// Tesseract OCR backend.
pub struct TesseractBackend {
    language: String,
}

impl TesseractBackend {
    /// Create a new Tesseract backend for English text.
    pub fn new() -> Self {
        Self::with_config(&OcrConfig::default())
    }

    /// Create a new Tesseract backend using the configured language.
    pub fn with_config(config: &OcrConfig) -> Self {
        Self {
            language: config.language.clone(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            format!("Tesseract is available (language: {})", self.language)
        } else {
            format!("Tesseract not installed ({})", TESSERACT_HINT)
        }
    }

    fn run_ocr(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(OcrError::OcrFailed(format!(
                    "tesseract failed: {}",
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                OcrError::BackendNotAvailable(format!("tesseract not found ({})", TESSERACT_HINT)),
            ),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}
