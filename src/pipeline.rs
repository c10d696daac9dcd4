use crate::error::{AssemblyError, ExtractionError};
use crate::headings::{find_headings, HeadingCandidate};
use crate::pdf::assemble::assemble;
use crate::pdf::font::TocFont;
use crate::pdf::render::render_toc;
use crate::pdf::text::{PageText, PageTextSource};
use crate::toc_text::format_toc;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written { headings: usize, toc_pages: usize },
    NoHeadings,
    Skipped(String),
}

/// Page text source plus the registered TOC font; one instance is shared by
/// all workers.
pub struct Pipeline {
    pub source: PageTextSource,
    pub font: TocFont,
}

/// Per-page text and the headings found in it.
pub struct Detection {
    pub pages: Vec<PageText>,
    pub headings: Vec<HeadingCandidate>,
}

pub fn detect_headings(source: &PageTextSource, input: &Path) -> Result<Detection, ExtractionError> {
    let pages = source.page_texts(input)?;
    let headings = find_headings(&pages);
    Ok(Detection { pages, headings })
}

impl Pipeline {
    pub fn new(source: PageTextSource, font: TocFont) -> Self {
        Pipeline { source, font }
    }

    /// Run the whole chain for one file. Failures are logged and reported in
    /// the outcome, never propagated.
    pub fn process_file(&self, input: &Path, output: &Path) -> FileOutcome {
        info!("Processing {}...", input.display());

        let detection = match detect_headings(&self.source, input) {
            Ok(detection) => detection,
            Err(e) => {
                warn!("Skipping {} due to extraction error: {}", input.display(), e);
                return FileOutcome::Skipped(e.to_string());
            }
        };

        if detection.headings.is_empty() {
            info!(
                "No headers found in {}, skipping TOC creation.",
                input.display()
            );
            return FileOutcome::NoHeadings;
        }

        match self.write_with_toc(input, output, &detection.headings) {
            Ok(toc_pages) => {
                info!("Saved processed file to {}", output.display());
                FileOutcome::Written {
                    headings: detection.headings.len(),
                    toc_pages,
                }
            }
            Err(e) => {
                warn!("Error processing {}: {}", input.display(), e);
                FileOutcome::Skipped(e.to_string())
            }
        }
    }

    /// Render the TOC for `headings`, prepend it to `input` and save as `output`.
    /// Returns the number of TOC pages.
    pub fn write_with_toc(
        &self,
        input: &Path,
        output: &Path,
        headings: &[HeadingCandidate],
    ) -> Result<usize, AssemblyError> {
        let toc = render_toc(&format_toc(headings), &self.font)?;
        let toc_pages = toc.page_count;

        let mut doc = assemble(input, toc)?;
        debug!(
            pages = doc.page_count(),
            toc_pages,
            "assembled {}",
            output.display()
        );
        doc.save(output)?;
        Ok(toc_pages)
    }
}
