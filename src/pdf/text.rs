use crate::config::Config;
use crate::error::ExtractionError;
use crate::pdf::ocr::{OcrEngine, Pdftoppm, Rasterizer, Tesseract};
use std::path::Path;
use tracing::{debug, warn};

/// Pulls embedded text out of every page of a PDF.
pub trait TextExtractor: Send + Sync {
    /// One entry per document page, in page order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError>;
}

/// Embedded-text extraction with `pdf-extract`.
pub struct PdfExtract;

impl TextExtractor for PdfExtract {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractionError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let doc = lopdf::Document::load_mem(&bytes).map_err(|e| ExtractionError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let total_pages = doc.get_pages().len();

        // pdf-extract can panic on malformed PDFs
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        }));

        let mut pages = match result {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                return Err(ExtractionError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ExtractionError::Panicked {
                    path: path.to_path_buf(),
                })
            }
        };

        // pdf-extract starts every page with blank lines
        for page in &mut pages {
            let trimmed = page.trim_start_matches(['\n', '\r']);
            if trimmed.len() != page.len() {
                *page = trimmed.to_string();
            }
        }

        if pages.len() != total_pages {
            debug!(
                path = %path.display(),
                extracted = pages.len(),
                total_pages,
                "extracted page count differs from page tree"
            );
            pages.resize(total_pages, String::new());
        }

        Ok(pages)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOrigin {
    /// Text embedded in the PDF.
    Extracted,
    /// Recognized from a rendered image.
    Ocr,
    /// No embedded text and the OCR fallback failed; text is empty.
    Degraded,
}

#[derive(Debug, Clone)]
pub struct PageText {
    pub page: u32,
    pub text: String,
    pub origin: TextOrigin,
}

impl AsRef<str> for PageText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Per-page text with an OCR fallback for pages that have no embedded text.
pub struct PageTextSource {
    pub extractor: Box<dyn TextExtractor>,
    pub rasterizer: Box<dyn Rasterizer>,
    pub ocr: Box<dyn OcrEngine>,
}

impl PageTextSource {
    /// pdf-extract for embedded text, pdftoppm + tesseract for the OCR fallback.
    pub fn from_config(config: &Config) -> Self {
        PageTextSource {
            extractor: Box::new(PdfExtract),
            rasterizer: Box::new(Pdftoppm {
                program: config.tools.pdftoppm.clone(),
                dpi: config.render_dpi,
            }),
            ocr: Box::new(Tesseract {
                program: config.tools.tesseract.clone(),
                languages: config.ocr_languages.clone(),
            }),
        }
    }

    pub fn page_texts(&self, path: &Path) -> Result<Vec<PageText>, ExtractionError> {
        let extracted = self.extractor.extract_pages(path)?;

        let pages = extracted
            .into_iter()
            .enumerate()
            .map(|(idx, text)| {
                let page = (idx + 1) as u32;
                if text.trim().is_empty() {
                    self.ocr_page(path, page)
                } else {
                    PageText {
                        page,
                        text,
                        origin: TextOrigin::Extracted,
                    }
                }
            })
            .collect();

        Ok(pages)
    }

    fn ocr_page(&self, path: &Path, page: u32) -> PageText {
        let degraded = PageText {
            page,
            text: String::new(),
            origin: TextOrigin::Degraded,
        };

        let rendered = match self.rasterizer.render_page(path, page) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(
                    "Failed to convert page {} to image in {}: {}",
                    page,
                    path.display(),
                    e
                );
                return degraded;
            }
        };

        match self.ocr.recognize(&rendered.image) {
            Ok(text) => {
                debug!(page, chars = text.len(), "recognized page with OCR");
                PageText {
                    page,
                    text,
                    origin: TextOrigin::Ocr,
                }
            }
            Err(e) => {
                warn!(
                    "Error extracting text from image of page {} in {}: {}",
                    page,
                    path.display(),
                    e
                );
                degraded
            }
        }
    }
}
