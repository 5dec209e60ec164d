//! Poppler command-line tools: page counts, text layers, and page images.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::backend::{OcrError, PageRasterizer};
use super::extractor::{ExtractionError, TextLayer};
use super::tools::POPPLER_HINT;

/// Handle command output, extracting stdout on success or returning appropriate error.
fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ExtractionError::ExtractionFailed(format!(
                "{}: {}",
                error_prefix,
                stderr.trim()
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ExtractionError::ToolNotFound(
            format!("{} ({})", tool_name, POPPLER_HINT),
        )),
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Poppler-backed text layer reader and rasterizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct Poppler;

impl TextLayer for Poppler {
    fn page_count(&self, pdf_path: &Path) -> Result<u32, ExtractionError> {
        let output = Command::new("pdfinfo").arg(pdf_path).output();
        let info = handle_cmd_output(output, "pdfinfo", "pdfinfo failed")?;

        parse_page_count(&info).ok_or_else(|| {
            ExtractionError::ExtractionFailed("pdfinfo reported no page count".to_string())
        })
    }

    fn page_text(&self, pdf_path: &Path, page: u32) -> Result<String, ExtractionError> {
        let page_str = page.to_string();
        let output = Command::new("pdftotext")
            .args(["-layout", "-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
            .arg(pdf_path)
            .arg("-") // Output to stdout
            .output();

        handle_cmd_output(
            output,
            "pdftotext",
            &format!("pdftotext failed on page {}", page),
        )
    }
}

impl PageRasterizer for Poppler {
    fn rasterize(
        &self,
        pdf_path: &Path,
        dpi: u32,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, OcrError> {
        let status = Command::new("pdftoppm")
            .args(["-png", "-r", &dpi.to_string()])
            .arg(pdf_path)
            .arg(output_dir.join("page"))
            .status();

        match status {
            Ok(s) if s.success() => {}
            Ok(s) => {
                return Err(OcrError::OcrFailed(format!(
                    "pdftoppm failed to convert PDF ({})",
                    s
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OcrError::BackendNotAvailable(format!(
                    "pdftoppm not found ({})",
                    POPPLER_HINT
                )))
            }
            Err(e) => return Err(OcrError::Io(e)),
        }

        let images = collect_page_images(output_dir)?;
        if images.is_empty() {
            return Err(OcrError::OcrFailed(
                "No images generated from PDF".to_string(),
            ));
        }
        Ok(images)
    }
}

/// Read the `Pages:` line from `pdfinfo` output.
pub fn parse_page_count(pdfinfo_output: &str) -> Option<u32> {
    pdfinfo_output
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|n| n.parse().ok())
}

/// Page number encoded in a pdftoppm file name (`page-7.png`, `page-07.png`, `page-007.png`).
pub fn page_number_of(image_path: &Path) -> Option<u32> {
    let stem = image_path.file_stem()?.to_str()?;
    stem.strip_prefix("page-")?.parse().ok()
}

/// Find the PNG images pdftoppm wrote into `dir`, ordered by page number.
///
/// The zero padding width varies with total page count, so ordering goes by
/// the parsed number rather than the file name.
pub fn collect_page_images(dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let mut images: Vec<(u32, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
        .filter_map(|p| page_number_of(&p).map(|n| (n, p)))
        .collect();

    images.sort_by_key(|(n, _)| *n);
    Ok(images.into_iter().map(|(_, p)| p).collect())
}
