//! Page-delimited extraction results.

use std::collections::BTreeMap;

/// Method used to extract text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Direct text extraction from the PDF's embedded text layer.
    TextLayer,
    /// OCR over rasterized pages.
    Ocr,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::TextLayer => "text-layer",
            ExtractionMethod::Ocr => "ocr",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Separator written before each page's text.
pub fn page_header(page: u32) -> String {
    format!("\n--- Page {} ---\n", page)
}

/// Drop the form feeds that pdftotext and tesseract append after each page.
pub fn clean_page_text(raw: &str) -> &str {
    raw.trim_end_matches('\u{c}')
}

/// Text extracted from one document, keyed by 1-based page number.
///
/// Only pages that produced non-blank text are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pages: BTreeMap<u32, String>,
    method: ExtractionMethod,
}

impl ExtractedText {
    pub fn new(method: ExtractionMethod) -> Self {
        Self {
            pages: BTreeMap::new(),
            method,
        }
    }

    /// Record a page's text. Returns false (and stores nothing) if it is blank.
    pub fn push_page(&mut self, page: u32, raw: &str) -> bool {
        let text = clean_page_text(raw);
        if text.trim().is_empty() {
            return false;
        }
        self.pages.insert(page, text.to_string());
        true
    }

    pub fn method(&self) -> ExtractionMethod {
        self.method
    }

    /// Number of pages that contributed text.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> impl Iterator<Item = (u32, &str)> {
        self.pages.iter().map(|(n, t)| (*n, t.as_str()))
    }

    pub fn is_blank(&self) -> bool {
        self.pages.values().all(|t| t.trim().is_empty())
    }

    /// Render the document: each page preceded by its `--- Page N ---` header.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (page, text) in &self.pages {
            out.push_str(&page_header(*page));
            out.push_str(text);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_headers() {
        let mut doc = ExtractedText::new(ExtractionMethod::TextLayer);
        doc.push_page(1, "Hello");
        doc.push_page(2, "World\n\u{c}");

        assert_eq!(
            doc.text(),
            "\n--- Page 1 ---\nHello\n--- Page 2 ---\nWorld\n"
        );
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn test_blank_pages_skipped_but_numbering_kept() {
        let mut doc = ExtractedText::new(ExtractionMethod::Ocr);
        assert!(!doc.push_page(1, "  \n\u{c}"));
        assert!(doc.push_page(2, "second"));

        assert_eq!(doc.text(), "\n--- Page 2 ---\nsecond");
        assert_eq!(doc.pages().map(|(n, _)| n).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_empty_document_is_blank() {
        let doc = ExtractedText::new(ExtractionMethod::TextLayer);
        assert!(doc.is_blank());
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn test_pages_render_in_page_order() {
        let mut doc = ExtractedText::new(ExtractionMethod::TextLayer);
        doc.push_page(3, "c");
        doc.push_page(1, "a");
        assert_eq!(doc.text(), "\n--- Page 1 ---\na\n--- Page 3 ---\nc");
    }

    #[test]
    fn test_method_display() {
        assert_eq!(ExtractionMethod::TextLayer.to_string(), "text-layer");
        assert_eq!(ExtractionMethod::Ocr.to_string(), "ocr");
    }
}
