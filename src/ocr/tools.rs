//! External tool discovery.

/// Hint shown when a Poppler binary is missing.
pub const POPPLER_HINT: &str = "install poppler-utils";

/// Hint shown when Tesseract is missing.
pub const TESSERACT_HINT: &str = "install tesseract-ocr";

/// Tools the extraction pipeline shells out to.
pub const REQUIRED_TOOLS: [&str; 4] = ["pdfinfo", "pdftotext", "pdftoppm", "tesseract"];

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Check if required tools are available.
pub fn check_tools() -> Vec<(String, bool)> {
    REQUIRED_TOOLS
        .iter()
        .map(|tool| (tool.to_string(), check_binary(tool)))
        .collect()
}

/// Installation hint for one of the required tools.
pub fn install_hint(tool: &str) -> &'static str {
    if tool == "tesseract" {
        TESSERACT_HINT
    } else {
        POPPLER_HINT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tools_reports_every_tool() {
        let tools = check_tools();
        assert_eq!(tools.len(), REQUIRED_TOOLS.len());
        for (tool, available) in tools {
            println!("{}: {}", tool, if available { "found" } else { "missing" });
        }
    }

    #[test]
    fn test_missing_binary() {
        assert!(!check_binary("scanscribe-definitely-not-installed"));
    }

    #[test]
    fn test_install_hint() {
        assert_eq!(install_hint("tesseract"), TESSERACT_HINT);
        assert_eq!(install_hint("pdftoppm"), POPPLER_HINT);
    }
}
