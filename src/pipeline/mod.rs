//! The conversion pipeline.
//!
//! Language data, rasterization, OCR, native text and PDF assembly run one
//! after another on the calling thread. A rasterization failure is reported
//! as `Ok(None)`; every other failure is an error.

mod types;

use std::path::Path;

use tempfile::TempDir;
use thiserror::Error;

use crate::config::{ConfigError, Settings};
use crate::ocr::{LanguageSet, OcrBackend, OcrError, TessdataStore, TesseractBackend};
use crate::pdf::{
    NativeTextSource, Pdftoppm, Pdftotext, Rasterizer, SearchablePdfWriter, TextError, WriteError,
};

pub use types::{Conversion, ConvertEvent, PageText};

/// Errors that abort a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Text extraction failed: {0}")]
    Text(#[from] TextError),

    #[error("Writing output failed: {0}")]
    Write(#[from] WriteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-run parameters.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub dpi: u32,
    pub languages: LanguageSet,
}

impl ConvertOptions {
    pub fn new(dpi: u32, languages: LanguageSet) -> Self {
        Self { dpi, languages }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::new(settings.dpi, settings.language_set()?))
    }
}

/// Runs the PDF -> images -> OCR -> searchable PDF pipeline.
pub struct Converter {
    rasterizer: Box<dyn Rasterizer>,
    ocr: Box<dyn OcrBackend>,
    text_source: Box<dyn NativeTextSource>,
    tessdata: TessdataStore,
    font_size: f32,
}

impl Converter {
    pub fn new(
        rasterizer: Box<dyn Rasterizer>,
        ocr: Box<dyn OcrBackend>,
        text_source: Box<dyn NativeTextSource>,
        tessdata: TessdataStore,
    ) -> Self {
        Self {
            rasterizer,
            ocr,
            text_source,
            tessdata,
            font_size: 10.0,
        }
    }

    /// Font size of the invisible text layer.
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Converter wired to Poppler, Tesseract and HTTP model downloads.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConvertError> {
        let tessdata = TessdataStore::from_settings(settings)?;

        let rasterizer = Pdftoppm::new()
            .with_binary(&settings.tools.pdftoppm)
            .with_jpeg_quality(settings.jpeg_quality);
        let ocr = TesseractBackend::new(&settings.tessdata_dir)
            .with_binary(&settings.tools.tesseract);
        let text_source = Pdftotext::new().with_binary(&settings.tools.pdftotext);

        Ok(Self::new(
            Box::new(rasterizer),
            Box::new(ocr),
            Box::new(text_source),
            tessdata,
        )
        .with_font_size(settings.text_font_size))
    }

    pub fn tessdata(&self) -> &TessdataStore {
        &self.tessdata
    }

    pub fn ocr_backend(&self) -> &dyn OcrBackend {
        self.ocr.as_ref()
    }

    /// Convert `input` into a searchable PDF at `output`.
    ///
    /// Returns `Ok(None)` without writing anything if the input could not be
    /// rendered to images.
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        options: &ConvertOptions,
    ) -> Result<Option<Conversion>, ConvertError> {
        self.convert_with_events(input, output, options, &mut |_: ConvertEvent| {})
    }

    /// Like [`Converter::convert`], reporting progress to `on_event`.
    pub fn convert_with_events(
        &self,
        input: &Path,
        output: &Path,
        options: &ConvertOptions,
        on_event: &mut dyn FnMut(ConvertEvent),
    ) -> Result<Option<Conversion>, ConvertError> {
        let fetched = self.tessdata.ensure(&options.languages)?;
        on_event(ConvertEvent::LanguagesReady { fetched });

        let temp_dir = TempDir::new()?;
        let images = match self
            .rasterizer
            .rasterize(input, options.dpi, temp_dir.path())
        {
            Ok(images) => images,
            Err(e) => {
                tracing::error!(
                    "Failed to convert {} to images: {}",
                    input.display(),
                    e
                );
                tracing::warn!("Ensure Poppler (pdftoppm) is installed and on PATH");
                on_event(ConvertEvent::RasterizeFailed {
                    error: e.to_string(),
                });
                return Ok(None);
            }
        };

        tracing::info!(
            "Rendered {} pages of {} at {} dpi",
            images.len(),
            input.display(),
            options.dpi
        );
        on_event(ConvertEvent::Rasterized {
            total_pages: images.len(),
        });

        let mut writer = SearchablePdfWriter::new(self.font_size);
        let mut pages = Vec::with_capacity(images.len());

        for image in &images {
            on_event(ConvertEvent::PageStarted {
                page_number: image.page_number,
            });

            let ocr = self.ocr.ocr_image(image, &options.languages)?;
            tracing::debug!(
                "Page {} OCR took {}ms",
                image.page_number,
                ocr.processing_time_ms
            );
            let native = self.text_source.page_text(input, image.page_number)?;
            let page = PageText::new(image.page_number, native, ocr.text);

            writer.add_page(image, image.read_jpeg()?, &page.combined)?;

            on_event(ConvertEvent::PageCompleted {
                page_number: page.page_number,
                ocr_chars: page.ocr_text.chars().count(),
                native_chars: page.native_text.chars().count(),
            });
            pages.push(page);
        }

        let page_count = writer.page_count();
        writer.save(output)?;
        tracing::info!("Saved {} ({} pages)", output.display(), page_count);
        on_event(ConvertEvent::Saved {
            path: output.to_path_buf(),
            pages: page_count,
        });

        Ok(Some(Conversion {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            dpi: options.dpi,
            languages: options.languages.clone(),
            pages,
        }))
    }
}
