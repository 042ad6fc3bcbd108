//! PDF input and output.
//!
//! - pdftoppm (Poppler) renders input pages to JPEG images
//! - pdftotext (Poppler) extracts text already embedded in input pages
//! - lopdf assembles the searchable output document

mod encoding;
mod render;
mod text;
mod writer;

pub use encoding::encode_win_ansi;
pub use render::{ColorSpace, PageImage, Pdftoppm, Rasterizer, RenderError};
pub use text::{NativeTextSource, Pdftotext, TextError};
pub use writer::{SearchablePdfWriter, WriteError};
