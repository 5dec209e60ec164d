//! OCR and text extraction module.
//!
//! Extracts text from PDFs using:
//! - pdfinfo + pdftotext (Poppler) for the embedded text layer
//! - pdftoppm (Poppler) + Tesseract OCR for scanned documents
//!
//! The text layer is always tried first; OCR only runs when it yields nothing.

mod backend;
mod extractor;
mod pages;
mod poppler;
mod tesseract;
mod tools;

pub use backend::{OcrBackend, OcrConfig, OcrError, PageRasterizer, DEFAULT_DPI};
pub use extractor::{ExtractionError, TextExtractor, TextLayer};
pub use pages::{clean_page_text, page_header, ExtractedText, ExtractionMethod};
pub use poppler::{collect_page_images, parse_page_count, Poppler};
pub use tesseract::TesseractBackend;
pub use tools::{check_binary, check_tools, install_hint};
