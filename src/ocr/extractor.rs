//! Text extraction from PDFs: direct text layer first, OCR as fallback.

use std::path::Path;

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::backend::{OcrBackend, OcrConfig, PageRasterizer};
use super::pages::{ExtractedText, ExtractionMethod};
use super::poppler::Poppler;
use super::tesseract::TesseractBackend;

/// Errors that can occur while reading a PDF's text layer.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for reading the embedded text layer of a PDF.
pub trait TextLayer: Send + Sync {
    /// Open the document and report how many pages it has.
    fn page_count(&self, pdf_path: &Path) -> Result<u32, ExtractionError>;

    /// Extract the text layer of a single 1-based page.
    fn page_text(&self, pdf_path: &Path, page: u32) -> Result<String, ExtractionError>;
}

/// Text extractor with a direct stage and an OCR stage.
///
/// Neither stage returns an error: document-level failures are logged and
/// yield an empty result, page-level failures are logged and that page
/// contributes nothing.
pub struct TextExtractor {
    config: OcrConfig,
    text_layer: Box<dyn TextLayer>,
    rasterizer: Box<dyn PageRasterizer>,
    ocr: Box<dyn OcrBackend>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(OcrConfig::default())
    }
}

impl TextExtractor {
    /// Create an extractor backed by Poppler and Tesseract.
    pub fn new(config: OcrConfig) -> Self {
        let ocr = TesseractBackend::with_config(&config);
        Self {
            config,
            text_layer: Box::new(Poppler),
            rasterizer: Box::new(Poppler),
            ocr: Box::new(ocr),
        }
    }

    /// Replace the text layer reader.
    pub fn with_text_layer(mut self, text_layer: impl TextLayer + 'static) -> Self {
        self.text_layer = Box::new(text_layer);
        self
    }

    /// Replace the page rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: impl PageRasterizer + 'static) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self
    }

    /// Replace the OCR backend.
    pub fn with_ocr_backend(mut self, backend: impl OcrBackend + 'static) -> Self {
        self.ocr = Box::new(backend);
        self
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    pub fn ocr_backend(&self) -> &dyn OcrBackend {
        self.ocr.as_ref()
    }

    /// Extract the embedded text layer, page by page.
    pub fn extract_text_layer(&self, pdf_path: &Path) -> ExtractedText {
        let mut doc = ExtractedText::new(ExtractionMethod::TextLayer);

        let page_count = match self.text_layer.page_count(pdf_path) {
            Ok(n) => n,
            Err(e) => {
                error!("Text layer extraction failed for {}: {}", pdf_path.display(), e);
                return doc;
            }
        };
        debug!("{} has {} pages", pdf_path.display(), page_count);

        for page in 1..=page_count {
            match self.text_layer.page_text(pdf_path, page) {
                Ok(text) => {
                    doc.push_page(page, &text);
                }
                Err(e) => warn!("Failed to extract page {}: {}", page, e),
            }
        }

        if !doc.is_blank() {
            info!(
                "Successfully extracted text layer ({} of {} pages)",
                doc.page_count(),
                page_count
            );
        }
        doc
    }

    /// Rasterize every page and run OCR on each image.
    pub fn extract_with_ocr(&self, pdf_path: &Path) -> ExtractedText {
        let mut doc = ExtractedText::new(ExtractionMethod::Ocr);

        // Images live only as long as this directory.
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(e) => {
                error!("OCR extraction failed: could not create temp dir: {}", e);
                return doc;
            }
        };

        let images = match self
            .rasterizer
            .rasterize(pdf_path, self.config.dpi, temp_dir.path())
        {
            Ok(images) => images,
            Err(e) => {
                error!("OCR extraction failed for {}: {}", pdf_path.display(), e);
                return doc;
            }
        };
        debug!(
            "Rasterized {} pages at {} DPI, running {} ({})",
            images.len(),
            self.config.dpi,
            self.ocr.name(),
            self.config.language
        );

        for (page, image_path) in (1u32..).zip(images.iter()) {
            match self.ocr.run_ocr(image_path) {
                Ok(text) => {
                    doc.push_page(page, &text);
                }
                Err(e) => warn!("Failed to OCR page {}: {}", page, e),
            }
        }

        if doc.is_blank() {
            warn!("No text could be extracted from the PDF");
        } else {
            info!("Successfully extracted text using OCR");
        }
        doc
    }
}
