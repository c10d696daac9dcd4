use crate::cli::ConfigArgs;
use crate::pdf::font::TocFont;
use crate::pdf::text::PageTextSource;
use crate::pipeline::{FileOutcome, Pipeline};
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config_args: &ConfigArgs,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();
    let config = config_args.resolve()?;

    let font = TocFont::register(&config.font_path)
        .with_context(|| "Failed to register TOC font")?;
    let pipeline = Pipeline::new(PageTextSource::from_config(&config), font);

    match pipeline.process_file(input, output) {
        FileOutcome::Written {
            headings,
            toc_pages,
        } => println!(
            "Added {} heading(s) on {} TOC page(s) to {}",
            headings,
            toc_pages,
            output.display()
        ),
        FileOutcome::NoHeadings => println!("No headings found, nothing written."),
        FileOutcome::Skipped(reason) => anyhow::bail!("{}: {}", input.display(), reason),
    }

    Ok(())
}
