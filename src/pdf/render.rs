//! Page rasterization with pdftoppm (Poppler).

use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::ImageDecoder;
use thiserror::Error;

use crate::tool::{Tool, ToolError};

/// File name prefix pdftoppm writes page images under.
const PAGE_PREFIX: &str = "page";

/// Errors that can occur while rendering pages to images.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("No page images were produced")]
    NoPages,

    #[error("Unreadable page image {path}: {message}")]
    Image { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Colour model of a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
}

impl ColorSpace {
    /// PDF colour space name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::Gray => "DeviceGray",
            ColorSpace::Rgb => "DeviceRGB",
        }
    }
}

/// A JPEG rendering of one input page.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page number in the input document.
    pub page_number: u32,
    pub path: PathBuf,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    pub color_space: ColorSpace,
    /// Resolution the page was rendered at.
    pub dpi: u32,
}

impl PageImage {
    /// Describe a JPEG on disk by reading its header.
    pub fn from_jpeg(page_number: u32, path: PathBuf, dpi: u32) -> Result<Self, RenderError> {
        let image_err = |message: String| RenderError::Image {
            path: path.clone(),
            message,
        };

        let file = std::fs::File::open(&path)?;
        let decoder = image::codecs::jpeg::JpegDecoder::new(BufReader::new(file))
            .map_err(|e| image_err(e.to_string()))?;
        let (width, height) = decoder.dimensions();
        if width == 0 || height == 0 {
            return Err(image_err("zero-sized image".to_string()));
        }

        let color_space = match decoder.color_type() {
            image::ColorType::L8 | image::ColorType::L16 => ColorSpace::Gray,
            _ => ColorSpace::Rgb,
        };

        Ok(Self {
            page_number,
            path,
            width,
            height,
            color_space,
            dpi,
        })
    }

    /// Raw JPEG bytes, for embedding.
    pub fn read_jpeg(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// Turns every page of a PDF into an image.
pub trait Rasterizer {
    /// Render all pages of `pdf` at `dpi` into `out_dir`, ordered by page number.
    fn rasterize(
        &self,
        pdf: &Path,
        dpi: u32,
        out_dir: &Path,
    ) -> Result<Vec<PageImage>, RenderError>;
}

/// Rasterizer backed by Poppler's `pdftoppm`.
pub struct Pdftoppm {
    binary: PathBuf,
    jpeg_quality: u8,
}

impl Default for Pdftoppm {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("pdftoppm"),
            jpeg_quality: 90,
        }
    }
}

impl Pdftoppm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

impl Rasterizer for Pdftoppm {
    fn rasterize(
        &self,
        pdf: &Path,
        dpi: u32,
        out_dir: &Path,
    ) -> Result<Vec<PageImage>, RenderError> {
        let tool = Tool::new(&self.binary, "poppler-utils");
        tracing::debug!("pdftoppm {} at {} dpi", pdf.display(), dpi);

        let output = tool
            .command()
            .args(["-jpeg", "-r", &dpi.to_string()])
            .args(["-jpegopt", &format!("quality={}", self.jpeg_quality)])
            .arg(pdf)
            .arg(out_dir.join(PAGE_PREFIX))
            .output();
        tool.check(output)?;

        collect_page_images(out_dir, dpi)
    }
}

/// Parse the page number out of a pdftoppm output file name.
///
/// pdftoppm zero-pads to the width of the page count: `page-1.jpg`,
/// `page-01.jpg`, `page-001.jpg`, ...
fn page_number_from_name(name: &str) -> Option<u32> {
    let number = name
        .strip_suffix(".jpg")?
        .strip_prefix(PAGE_PREFIX)?
        .strip_prefix('-')?;
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    number.parse().ok()
}

/// Find rendered pages in `dir`, sorted by page number.
fn collect_page_images(dir: &Path, dpi: u32) -> Result<Vec<PageImage>, RenderError> {
    let mut numbered: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name();
            page_number_from_name(name.to_str()?).map(|n| (n, e.path()))
        })
        .collect();

    if numbered.is_empty() {
        return Err(RenderError::NoPages);
    }

    numbered.sort_by_key(|(n, _)| *n);
    numbered
        .into_iter()
        .map(|(n, path)| PageImage::from_jpeg(n, path, dpi))
        .collect()
}
