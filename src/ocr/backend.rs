//! OCR backend abstraction.

use thiserror::Error;

use super::languages::{LanguageError, LanguageSet};
use crate::pdf::PageImage;
use crate::tool::ToolError;

/// Errors that can occur during OCR or language data management.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Language(#[from] LanguageError),

    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text recognized in one image.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Recognized text, as the engine emitted it.
    pub text: String,
    /// Wall-clock time spent in the engine.
    pub processing_time_ms: u64,
}

/// An engine that turns page images into text.
pub trait OcrBackend {
    /// Short name for logs and the `check` command.
    fn name(&self) -> &'static str;

    /// Whether the engine can run on this machine.
    fn is_available(&self) -> bool;

    /// Install hint shown when the engine is unavailable.
    fn availability_hint(&self) -> String;

    /// Recognize the text in a rendered page.
    fn ocr_image(&self, image: &PageImage, languages: &LanguageSet) -> Result<OcrResult, OcrError>;
}
