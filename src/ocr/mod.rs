//! OCR module.
//!
//! - Tesseract OCR (via the `tesseract` binary) for page images
//! - Language set parsing (`eng+spa+fra`)
//! - The tessdata model cache, downloading missing languages on demand

mod backend;
mod languages;
mod tessdata;
mod tesseract;

pub use backend::{OcrBackend, OcrError, OcrResult};
pub use languages::{is_valid_code, LanguageError, LanguageSet, LANGUAGE_SEPARATOR};
pub use tessdata::{HttpFetcher, ModelFetcher, TessdataStore, MODEL_EXTENSION};
pub use tesseract::TesseractBackend;
