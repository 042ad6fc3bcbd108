//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line for text extraction.

use std::path::PathBuf;
use std::time::Instant;

use super::backend::{OcrBackend, OcrError, OcrResult};
use super::languages::LanguageSet;
use crate::pdf::PageImage;
use crate::tool::{check_binary, Tool};

/// Tesseract OCR backend.
pub struct TesseractBackend {
    binary: PathBuf,
    tessdata_dir: PathBuf,
}

impl TesseractBackend {
    /// Create a backend that reads models from `tessdata_dir`.
    pub fn new(tessdata_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            tessdata_dir: tessdata_dir.into(),
        }
    }

    /// Use a specific tesseract binary instead of the one on PATH.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    fn tool(&self) -> Tool<'_> {
        Tool::new(&self.binary, "tesseract-ocr")
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary(&self.binary)
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "Tesseract is available".to_string()
        } else {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        }
    }

    fn ocr_image(&self, image: &PageImage, languages: &LanguageSet) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let tool = self.tool();

        tracing::debug!(
            "tesseract page {} ({}) with {}",
            image.page_number,
            image.path.display(),
            languages
        );

        let output = tool
            .command()
            .arg(&image.path)
            .arg("stdout")
            .arg("--tessdata-dir")
            .arg(&self.tessdata_dir)
            .args(["-l", &languages.to_string()])
            .args(["--dpi", &image.dpi.to_string()])
            .output();

        let text = tool.stdout(output)?;
        let elapsed = start.elapsed();

        Ok(OcrResult {
            text,
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}
