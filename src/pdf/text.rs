//! Native (embedded) text extraction with pdftotext.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::tool::{Tool, ToolError};

/// Errors that can occur while extracting embedded text.
#[derive(Debug, Error)]
pub enum TextError {
    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Source of machine-readable text already present in a PDF page.
pub trait NativeTextSource {
    /// Text of 1-based `page` in `pdf`. Empty for image-only pages.
    fn page_text(&self, pdf: &Path, page: u32) -> Result<String, TextError>;
}

/// Native text via Poppler's `pdftotext`.
pub struct Pdftotext {
    binary: PathBuf,
}

impl Default for Pdftotext {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("pdftotext"),
        }
    }
}

impl Pdftotext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl NativeTextSource for Pdftotext {
    fn page_text(&self, pdf: &Path, page: u32) -> Result<String, TextError> {
        let tool = Tool::new(&self.binary, "poppler-utils");
        let page_str = page.to_string();

        let output = tool
            .command()
            .args(["-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
            .arg(pdf)
            .arg("-") // Output to stdout
            .output();

        let text = tool.stdout(output)?;
        Ok(strip_page_breaks(text))
    }
}

/// pdftotext ends every page with a form feed.
fn strip_page_breaks(mut text: String) -> String {
    while text.ends_with('\u{c}') {
        text.pop();
    }
    text
}
