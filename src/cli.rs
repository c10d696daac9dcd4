use crate::config::Config;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tocpdf")]
#[command(about = "Detect section headings in PDFs and prepend a generated table of contents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Default)]
pub struct ConfigArgs {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// TrueType font with Latin and Cyrillic glyphs for the TOC pages
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// pdftoppm executable used to render pages for OCR
    #[arg(long)]
    pub pdftoppm: Option<PathBuf>,

    /// tesseract executable
    #[arg(long)]
    pub tesseract: Option<PathBuf>,
}

impl ConfigArgs {
    /// Defaults, overridden by the config file, overridden by flags.
    pub fn resolve(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;
        if let Some(font) = &self.font {
            config.font_path = font.clone();
        }
        if let Some(pdftoppm) = &self.pdftoppm {
            config.tools.pdftoppm = pdftoppm.clone();
        }
        if let Some(tesseract) = &self.tesseract {
            config.tools.tesseract = tesseract.clone();
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Add a table of contents to every PDF under the input directory
    Run {
        /// Input directory (default: train)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory mirroring the input tree (default: output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of files processed in parallel (default: available cores)
        #[arg(short = 'j', long)]
        workers: Option<usize>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the headings detected in a PDF
    Headings {
        /// PDF file to inspect
        path: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the table of contents text that would be rendered
    Toc {
        /// PDF file to inspect
        path: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Add a table of contents to a single PDF
    AddToc {
        /// PDF file to process
        path: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },
}
