//! Service layer for scanscribe.
//!
//! Sequencing and path management on top of the extractors, usable from the
//! CLI or any other caller.

pub mod loader;

pub use loader::{
    resolve_output_path, textdata_folder, validate_pdf_path, BatchConfig, BatchReport, LoadError,
    PdfLoader, TEXTDATA_DIR,
};
