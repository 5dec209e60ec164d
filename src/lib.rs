//! scanscribe - PDF text extraction with OCR fallback.
//!
//! Library backing two independent tools: a PDF-to-text pipeline that writes
//! into a `textdata` folder, and a one-shot prompt client for a hosted
//! chat-completion model.

pub mod cli;
pub mod config;
pub mod llm;
pub mod ocr;
pub mod services;

pub use config::{ConfigError, Settings};
pub use llm::{ChatModel, LlmClient, LlmConfig, LlmError};
pub use ocr::{ExtractedText, ExtractionMethod, OcrConfig, TextExtractor};
pub use services::{BatchConfig, BatchReport, LoadError, PdfLoader, TEXTDATA_DIR};
