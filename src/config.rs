use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime configuration. Every field has a default, so a config file only
/// needs to name what differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub font_path: PathBuf,
    pub ocr_languages: String,
    pub render_dpi: u32,
    pub workers: Option<usize>,
    pub tools: ToolPaths,
}

/// Locations of the external rasterization and OCR programs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub pdftoppm: PathBuf,
    pub tesseract: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_root: PathBuf::from("train"),
            output_root: PathBuf::from("output"),
            font_path: PathBuf::from("DejaVuSans.ttf"),
            ocr_languages: "rus+eng".to_string(),
            render_dpi: 150,
            workers: None,
            tools: ToolPaths::default(),
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        ToolPaths {
            pdftoppm: PathBuf::from("pdftoppm"),
            tesseract: PathBuf::from("tesseract"),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Load `path` if given, otherwise start from the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Config::default()),
        }
    }

    /// Worker pool size, falling back to the number of available cores.
    pub fn worker_count(&self) -> usize {
        self.workers
            .filter(|&n| n > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
    }
}
