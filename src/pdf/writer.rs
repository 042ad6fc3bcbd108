//! Builds the searchable output PDF.
//!
//! Every output page is one JPEG image XObject stretched over the full
//! MediaBox plus a text object drawn in render mode 3 (invisible), so viewers
//! can search and select the text without it ever being painted.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;

use super::encoding::encode_win_ansi;
use super::render::PageImage;

const IMAGE_NAME: &[u8] = b"Im0";
const FONT_NAME: &[u8] = b"F1";

/// Text render mode that neither fills nor strokes glyphs.
const INVISIBLE_RENDER_MODE: i64 = 3;

/// Baseline-to-baseline distance as a multiple of the font size.
const LEADING_FACTOR: f32 = 1.2;

/// Rough Helvetica advance per character, in em.
const AVERAGE_GLYPH_WIDTH: f32 = 0.6;

/// Errors that can occur while building or saving the output PDF.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accumulates image pages with invisible text into a new document.
pub struct SearchablePdfWriter {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    page_ids: Vec<ObjectId>,
    font_size: f32,
}

impl SearchablePdfWriter {
    /// Start an empty document whose text layer uses `font_size`.
    pub fn new(font_size: f32) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        Self {
            doc,
            pages_id,
            font_id,
            page_ids: Vec::new(),
            font_size,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append a page showing `image` (its JPEG bytes in `jpeg`) with `text`
    /// as the hidden layer. The page is exactly the image's pixel size.
    pub fn add_page(
        &mut self,
        image: &PageImage,
        jpeg: Vec<u8>,
        text: &str,
    ) -> Result<ObjectId, WriteError> {
        let width = image.width as f32;
        let height = image.height as f32;

        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => image.color_space.pdf_name(),
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(height),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.to_vec())]),
            Operation::new("Q", vec![]),
        ];
        operations.extend(self.text_operations(text, width, height));

        let content = Content { operations };
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(image.width as i64),
                Object::Integer(image.height as i64),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
                "Font" => dictionary! {
                    "F1" => self.font_id,
                },
            },
        });

        self.page_ids.push(page_id);
        Ok(page_id)
    }

    /// Invisible text block anchored at the top-left corner, one `Tj` per line.
    ///
    /// Every baseline is placed with an absolute `Tm`, so the block is shrunk
    /// to fit the page height and long lines are squeezed to the page width.
    fn text_operations(&self, text: &str, page_width: f32, page_height: f32) -> Vec<Operation> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let lines: Vec<&str> = text.lines().collect();
        let (font_size, leading) = fit_block(self.font_size, page_height, lines.len());

        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(FONT_NAME.to_vec()), Object::Real(font_size)],
            ),
            Operation::new("Tr", vec![Object::Integer(INVISIBLE_RENDER_MODE)]),
        ];

        for (i, line) in lines.iter().enumerate() {
            let encoded = encode_win_ansi(line);
            if encoded.is_empty() {
                continue;
            }

            let y = (page_height - font_size - leading * i as f32).max(0.0);
            let natural_width = encoded.len() as f32 * font_size * AVERAGE_GLYPH_WIDTH;
            let x_scale = if natural_width > page_width {
                page_width / natural_width
            } else {
                1.0
            };

            ops.push(Operation::new(
                "Tm",
                vec![
                    Object::Real(x_scale),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Real(y),
                ],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(encoded, StringFormat::Literal)],
            ));
        }

        ops.push(Operation::new("ET", vec![]));
        ops
    }

    /// Close the page tree and return the finished document.
    pub fn finish(mut self) -> Document {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }

    /// Finish the document and write it to `path`.
    pub fn save(self, path: &Path) -> Result<(), WriteError> {
        let mut doc = self.finish();
        doc.save(path)?;
        Ok(())
    }
}

/// Font size and leading for `lines` lines, shrunk so the last baseline
/// does not drop below the bottom of a page `page_height` tall.
fn fit_block(font_size: f32, page_height: f32, lines: usize) -> (f32, f32) {
    let leading = font_size * LEADING_FACTOR;
    let span = font_size + leading * lines.saturating_sub(1) as f32;
    let scale = if span > page_height {
        page_height / span
    } else {
        1.0
    };
    (font_size * scale, leading * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::ColorSpace;
    use std::path::PathBuf;

    fn page(n: u32, width: u32, height: u32) -> PageImage {
        PageImage {
            page_number: n,
            path: PathBuf::from(format!("page-{}.jpg", n)),
            width,
            height,
            color_space: ColorSpace::Gray,
            dpi: 72,
        }
    }

    fn shown_strings(doc: &Document, page_id: ObjectId) -> Vec<Vec<u8>> {
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_pages_in_order_with_image_sizes() {
        let mut writer = SearchablePdfWriter::new(10.0);
        writer.add_page(&page(1, 100, 200), vec![0xFF, 0xD8], "one").unwrap();
        writer.add_page(&page(2, 300, 150), vec![0xFF, 0xD8], "two").unwrap();
        assert_eq!(writer.page_count(), 2);

        let doc = writer.finish();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let second = pages[&2];
        let dict = doc.get_dictionary(second).unwrap();
        let media_box = dict.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[2].as_i64().unwrap(), 300);
        assert_eq!(media_box[3].as_i64().unwrap(), 150);
        assert_eq!(shown_strings(&doc, second), vec![b"two".to_vec()]);
    }

    #[test]
    fn test_text_is_invisible_and_line_split() {
        let mut writer = SearchablePdfWriter::new(10.0);
        let id = writer
            .add_page(&page(1, 50, 50), vec![0xFF, 0xD8], "first line\n\nthird line")
            .unwrap();
        let doc = writer.finish();

        let content = Content::decode(&doc.get_page_content(id).unwrap()).unwrap();
        let render_mode = content
            .operations
            .iter()
            .find(|op| op.operator == "Tr")
            .and_then(|op| op.operands.first())
            .and_then(|o| o.as_i64().ok());
        assert_eq!(render_mode, Some(INVISIBLE_RENDER_MODE));
        assert_eq!(
            shown_strings(&doc, id),
            vec![b"first line".to_vec(), b"third line".to_vec()]
        );
        assert_eq!(
            content.operations.iter().filter(|op| op.operator == "Tm").count(),
            2
        );
    }

    /// `(horizontal scale, baseline y)` of every `Tm` on a page.
    fn text_matrices(doc: &Document, page_id: ObjectId) -> Vec<(f32, f32)> {
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tm")
            .map(|op| {
                (
                    op.operands[0].as_float().unwrap(),
                    op.operands[5].as_float().unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_many_lines_stay_on_page() {
        let text: Vec<String> = (1..=120).map(|i| format!("line {}", i)).collect();
        let mut writer = SearchablePdfWriter::new(10.0);
        let id = writer
            .add_page(&page(1, 612, 792), vec![0xFF, 0xD8], &text.join("\n"))
            .unwrap();
        let doc = writer.finish();

        assert_eq!(shown_strings(&doc, id).len(), 120);
        let matrices = text_matrices(&doc, id);
        assert_eq!(matrices.len(), 120);
        assert!(matrices.iter().all(|(_, y)| (0.0..=792.0).contains(y)));

        // Baselines still descend in reading order.
        assert!(matrices.windows(2).all(|w| w[0].1 > w[1].1));
    }

    #[test]
    fn test_short_block_keeps_configured_font_size() {
        let mut writer = SearchablePdfWriter::new(10.0);
        let id = writer
            .add_page(&page(1, 200, 200), vec![0xFF, 0xD8], "a\nb")
            .unwrap();
        let doc = writer.finish();

        let matrices = text_matrices(&doc, id);
        assert_eq!(matrices.len(), 2);
        assert_eq!(matrices[0].0, 1.0);
        assert!((matrices[0].1 - 190.0).abs() < 0.01);
        assert!((matrices[1].1 - 178.0).abs() < 0.01);
    }

    #[test]
    fn test_wide_line_squeezed_to_page_width() {
        let line = "w".repeat(200);
        let mut writer = SearchablePdfWriter::new(10.0);
        let id = writer.add_page(&page(1, 100, 100), vec![0xFF, 0xD8], &line).unwrap();
        let doc = writer.finish();

        let (x_scale, _) = text_matrices(&doc, id)[0];
        assert!(x_scale < 1.0);
        let natural_width = 200.0 * 10.0 * AVERAGE_GLYPH_WIDTH;
        assert!(natural_width * x_scale <= 100.0 + 0.01);
    }

    #[test]
    fn test_fit_block_shrinks_tall_blocks() {
        let (font, leading) = fit_block(10.0, 100.0, 1);
        assert_eq!(font, 10.0);
        assert!((leading - 12.0).abs() < 0.001);
        let (font, leading) = fit_block(10.0, 100.0, 50);
        assert!(font < 10.0);
        assert!(font + leading * 49.0 <= 100.0 + 0.001);
    }

    #[test]
    fn test_blank_text_has_no_text_object() {
        let mut writer = SearchablePdfWriter::new(10.0);
        let id = writer
            .add_page(&page(1, 10, 10), vec![0xFF, 0xD8], " \n ")
            .unwrap();
        let doc = writer.finish();

        let content = Content::decode(&doc.get_page_content(id).unwrap()).unwrap();
        assert!(content.operations.iter().all(|op| op.operator != "BT"));
        assert!(content.operations.iter().any(|op| op.operator == "Do"));
    }

    #[test]
    fn test_image_xobject_uses_dct() {
        let mut writer = SearchablePdfWriter::new(10.0);
        let id = writer
            .add_page(&page(1, 10, 20), vec![0xFF, 0xD8, 0xFF], "x")
            .unwrap();
        let doc = writer.finish();

        let page = doc.get_dictionary(id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
        let stream = doc.get_object(image_id).unwrap().as_stream().unwrap();

        let filter = stream.dict.get(b"Filter").unwrap().as_name().unwrap();
        let color_space = stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap();
        assert_eq!(filter, b"DCTDecode");
        assert_eq!(color_space, b"DeviceGray");
        assert_eq!(stream.content, vec![0xFF, 0xD8, 0xFF]);
    }
}
