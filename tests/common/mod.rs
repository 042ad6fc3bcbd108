//! Fakes for the pipeline's external tools.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use searchpdf::ocr::{ModelFetcher, OcrError, OcrResult};
use searchpdf::pdf::{RenderError, TextError};
use searchpdf::tool::ToolError;
use searchpdf::{LanguageSet, NativeTextSource, OcrBackend, PageImage, Rasterizer, TessdataStore};

/// Renders a fixed list of page sizes as blank JPEGs.
pub struct FakeRasterizer {
    pub sizes: Vec<(u32, u32)>,
    pub calls: Rc<Cell<usize>>,
}

impl FakeRasterizer {
    pub fn new(sizes: Vec<(u32, u32)>) -> Self {
        Self {
            sizes,
            calls: Rc::new(Cell::new(0)),
        }
    }
}

impl Rasterizer for FakeRasterizer {
    fn rasterize(
        &self,
        _pdf: &Path,
        dpi: u32,
        out_dir: &Path,
    ) -> Result<Vec<PageImage>, RenderError> {
        self.calls.set(self.calls.get() + 1);
        self.sizes
            .iter()
            .enumerate()
            .map(|(i, (w, h))| {
                let page_number = i as u32 + 1;
                let path = out_dir.join(format!("page-{}.jpg", page_number));
                image::RgbImage::from_pixel(*w, *h, image::Rgb([250, 250, 250]))
                    .save(&path)
                    .map_err(|e| RenderError::Image {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                PageImage::from_jpeg(page_number, path, dpi)
            })
            .collect()
    }
}

/// Behaves like pdftoppm missing from PATH.
pub struct BrokenRasterizer;

impl Rasterizer for BrokenRasterizer {
    fn rasterize(
        &self,
        _pdf: &Path,
        _dpi: u32,
        _out_dir: &Path,
    ) -> Result<Vec<PageImage>, RenderError> {
        Err(RenderError::Tool(ToolError::NotFound {
            tool: "pdftoppm".to_string(),
            package: "poppler-utils",
        }))
    }
}

/// Returns `OCR page N` for page N, recording the language string it saw.
pub struct FakeOcr {
    pub languages_seen: Rc<RefCell<Vec<String>>>,
    pub fail_on_page: Option<u32>,
}

impl FakeOcr {
    pub fn new() -> Self {
        Self {
            languages_seen: Rc::new(RefCell::new(Vec::new())),
            fail_on_page: None,
        }
    }
}

impl OcrBackend for FakeOcr {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        "always available".to_string()
    }

    fn ocr_image(&self, image: &PageImage, languages: &LanguageSet) -> Result<OcrResult, OcrError> {
        self.languages_seen.borrow_mut().push(languages.to_string());
        if self.fail_on_page == Some(image.page_number) {
            return Err(OcrError::Tool(ToolError::Failed {
                tool: "tesseract".to_string(),
                message: "Error opening data file".to_string(),
            }));
        }
        Ok(OcrResult {
            text: format!("  OCR page {}\n", image.page_number),
            processing_time_ms: 1,
        })
    }
}

/// Embedded text keyed by page number; pages not in the map have none.
pub struct FakeNativeText {
    pub pages: HashMap<u32, String>,
}

impl NativeTextSource for FakeNativeText {
    fn page_text(&self, _pdf: &Path, page: u32) -> Result<String, TextError> {
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}

/// Serves a small body for every URL and records each request.
pub struct CountingFetcher {
    pub urls: Rc<RefCell<Vec<String>>>,
    pub fail: bool,
}

impl ModelFetcher for CountingFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, OcrError> {
        self.urls.borrow_mut().push(url.to_string());
        if self.fail {
            return Err(OcrError::Download {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            });
        }
        Ok(b"traineddata".to_vec())
    }
}

/// Store under `dir` whose downloads are recorded in the returned list.
pub fn counting_store(dir: &Path, fail: bool) -> (TessdataStore, Rc<RefCell<Vec<String>>>) {
    let urls = Rc::new(RefCell::new(Vec::new()));
    let fetcher = CountingFetcher {
        urls: urls.clone(),
        fail,
    };
    (
        TessdataStore::new(dir, "https://models.test/tessdata", Box::new(fetcher)),
        urls,
    )
}
