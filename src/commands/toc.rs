use crate::cli::ConfigArgs;
use crate::pdf::render::TOC_TITLE;
use crate::pdf::text::PageTextSource;
use crate::pipeline::detect_headings;
use crate::toc_text::format_toc;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P, config_args: &ConfigArgs) -> Result<()> {
    let config = config_args.resolve()?;
    let source = PageTextSource::from_config(&config);
    let detection = detect_headings(&source, path.as_ref())?;

    if detection.headings.is_empty() {
        println!("No headings found.");
        return Ok(());
    }

    println!("{}", TOC_TITLE);
    println!("{}", format_toc(&detection.headings));

    Ok(())
}
