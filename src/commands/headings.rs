use crate::cli::ConfigArgs;
use crate::pdf::text::{PageTextSource, TextOrigin};
use crate::pipeline::detect_headings;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P, config_args: &ConfigArgs) -> Result<()> {
    let config = config_args.resolve()?;
    let source = PageTextSource::from_config(&config);
    let detection = detect_headings(&source, path.as_ref())?;

    for page in &detection.pages {
        match page.origin {
            TextOrigin::Extracted => {}
            TextOrigin::Ocr => println!("(page {} recognized with OCR)", page.page),
            TextOrigin::Degraded => println!("(page {} has no text)", page.page),
        }
    }

    if detection.headings.is_empty() {
        println!("No headings found.");
        return Ok(());
    }

    for heading in &detection.headings {
        println!("p{}: {}", heading.page, heading.text);
    }

    println!("\n{} heading(s) found.", detection.headings.len());

    Ok(())
}
