use std::path::PathBuf;
use thiserror::Error;

/// The input file could not be read or parsed; the whole file is skipped.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to read PDF {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse PDF {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Text extraction panicked on {path} (malformed PDF)")]
    Panicked { path: PathBuf },
}

/// A single page could not be converted to an image.
#[derive(Error, Debug)]
pub enum RasterizationError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} returned non-zero exit status for page {page}: {stderr}")]
    Failed {
        program: String,
        page: u32,
        stderr: String,
    },
    #[error("{program} did not produce an image for page {page}")]
    NoImage { program: String, page: u32 },
    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),
}

/// Recognition of a rendered page image failed.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} returned non-zero exit status: {stderr}")]
    Failed { program: String, stderr: String },
}

/// Building or writing the merged output document failed.
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Failed to load original PDF {path}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("Original PDF has a malformed page tree: {0}")]
    PageTree(String),
    #[error("Failed to render table of contents: {0}")]
    Render(String),
    #[error("Failed to save PDF {path}: {message}")]
    Save { path: PathBuf, message: String },
}

impl From<lopdf::Error> for AssemblyError {
    fn from(err: lopdf::Error) -> Self {
        AssemblyError::Render(err.to_string())
    }
}

/// The TOC font could not be registered. Fatal at startup.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("Failed to read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse font {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Font {path} has no glyph for {ch:?}")]
    MissingGlyph { path: PathBuf, ch: char },
}
