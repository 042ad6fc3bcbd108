//! searchpdf - searchable PDFs from scanned documents.
//!
//! Renders every page of a PDF to an image, runs Tesseract over it, merges
//! the OCR output with any text already embedded in the page, and writes a
//! new PDF whose pages are the images with an invisible text layer on top.

pub mod config;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod tool;

pub use config::{ConfigError, Settings};
pub use ocr::{LanguageSet, OcrBackend, TessdataStore, TesseractBackend};
pub use pdf::{NativeTextSource, PageImage, Pdftoppm, Pdftotext, Rasterizer, SearchablePdfWriter};
pub use pipeline::{Conversion, ConvertError, ConvertEvent, ConvertOptions, Converter, PageText};
