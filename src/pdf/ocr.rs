use crate::error::{OcrError, RasterizationError};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Renders a single PDF page to a raster image.
pub trait Rasterizer: Send + Sync {
    fn render_page(&self, pdf_path: &Path, page: u32) -> Result<RenderedPage, RasterizationError>;
}

/// Recognizes text in a raster image.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &Path) -> Result<String, OcrError>;
}

/// A page image on disk. The scratch directory is removed on drop.
pub struct RenderedPage {
    _dir: TempDir,
    pub image: PathBuf,
}

impl RenderedPage {
    pub fn new(dir: TempDir, image: PathBuf) -> Self {
        RenderedPage { _dir: dir, image }
    }
}

/// Poppler's `pdftoppm`.
pub struct Pdftoppm {
    pub program: PathBuf,
    pub dpi: u32,
}

impl Rasterizer for Pdftoppm {
    fn render_page(&self, pdf_path: &Path, page: u32) -> Result<RenderedPage, RasterizationError> {
        let program = self.program.display().to_string();
        let dir = tempfile::Builder::new()
            .prefix("tocpdf_page_")
            .tempdir()
            .map_err(RasterizationError::Scratch)?;
        let output_root = dir.path().join("page");

        let output = Command::new(&self.program)
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-singlefile")
            .arg("-png")
            .arg(pdf_path)
            .arg(&output_root)
            .output()
            .map_err(|source| RasterizationError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RasterizationError::Failed {
                program,
                page,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let image = output_root.with_extension("png");
        if !image.exists() {
            return Err(RasterizationError::NoImage { program, page });
        }

        Ok(RenderedPage::new(dir, image))
    }
}

/// The `tesseract` CLI with a fixed language hypothesis such as `rus+eng`.
pub struct Tesseract {
    pub program: PathBuf,
    pub languages: String,
}

impl OcrEngine for Tesseract {
    fn recognize(&self, image: &Path) -> Result<String, OcrError> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .output()
            .map_err(|source| OcrError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                program,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).replace('\u{0000}', ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_rasterizer_is_spawn_error() {
        let rasterizer = Pdftoppm {
            program: PathBuf::from("/nonexistent/tocpdf-pdftoppm"),
            dpi: 150,
        };
        let err = rasterizer
            .render_page(Path::new("input.pdf"), 1)
            .err()
            .unwrap();
        assert!(matches!(err, RasterizationError::Spawn { .. }));
    }

    #[test]
    fn test_missing_ocr_engine_is_spawn_error() {
        let ocr = Tesseract {
            program: PathBuf::from("/nonexistent/tocpdf-tesseract"),
            languages: "rus+eng".to_string(),
        };
        let err = ocr.recognize(Path::new("page.png")).unwrap_err();
        assert!(matches!(err, OcrError::Spawn { .. }));
    }
}
