use crate::batch::process_directory;
use crate::cli::ConfigArgs;
use crate::pdf::font::TocFont;
use crate::pdf::text::PageTextSource;
use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    workers: Option<usize>,
    config_args: &ConfigArgs,
) -> Result<()> {
    let mut config = config_args.resolve()?;
    if let Some(input) = input {
        config.input_root = input;
    }
    if let Some(output) = output {
        config.output_root = output;
    }
    if workers.is_some() {
        config.workers = workers;
    }

    // Nothing can be rendered without the font, so fail before touching any file.
    let font = TocFont::register(&config.font_path)
        .with_context(|| "Failed to register TOC font")?;
    let pipeline = Arc::new(Pipeline::new(PageTextSource::from_config(&config), font));

    let report = process_directory(
        pipeline,
        &config.input_root,
        &config.output_root,
        config.worker_count(),
    )
    .await?;

    println!(
        "Processed {} file(s): {} written, {} without headings, {} skipped",
        report.total(),
        report.written,
        report.no_headings,
        report.skipped
    );

    Ok(())
}
