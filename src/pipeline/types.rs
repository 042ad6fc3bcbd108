//! Conversion results and progress events.

use std::path::PathBuf;

use serde::Serialize;

use crate::ocr::LanguageSet;

/// Events emitted while a conversion runs.
#[derive(Debug, Clone)]
pub enum ConvertEvent {
    /// Language data is present; `fetched` lists codes downloaded this run.
    LanguagesReady { fetched: Vec<String> },
    /// Rendering pages to images failed; no output will be written.
    RasterizeFailed { error: String },
    /// All pages rendered.
    Rasterized { total_pages: usize },
    /// Page OCR and text extraction started
    PageStarted { page_number: u32 },
    /// Page added to the output document
    PageCompleted {
        page_number: u32,
        ocr_chars: usize,
        native_chars: usize,
    },
    /// Output document written.
    Saved { path: PathBuf, pages: usize },
}

/// Text gathered for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageText {
    /// 1-based page number.
    pub page_number: u32,
    /// OCR output with surrounding whitespace trimmed.
    pub ocr_text: String,
    /// Text embedded in the input page.
    pub native_text: String,
    /// Native text, a line break, then the raw OCR output. This is what the
    /// invisible layer carries.
    pub combined: String,
}

impl PageText {
    pub fn new(page_number: u32, native_text: String, raw_ocr: String) -> Self {
        let combined = format!("{}\n{}", native_text, raw_ocr);
        Self {
            page_number,
            ocr_text: raw_ocr.trim().to_string(),
            native_text,
            combined,
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dpi: u32,
    pub languages: LanguageSet,
    /// One entry per page, in page order.
    pub pages: Vec<PageText>,
}

impl Conversion {
    /// Trimmed OCR text of every page, in page order.
    pub fn ocr_texts(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.ocr_text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_is_native_then_ocr() {
        let page = PageText::new(3, "embedded".to_string(), "  scanned words \n".to_string());
        assert_eq!(page.combined, "embedded\n  scanned words \n");
        assert_eq!(page.ocr_text, "scanned words");
        assert_eq!(page.page_number, 3);
    }

    #[test]
    fn test_empty_native_text() {
        let page = PageText::new(1, String::new(), "ocr".to_string());
        assert_eq!(page.combined, "\nocr");
    }
}
