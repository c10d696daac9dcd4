mod batch;
mod cli;
mod commands;
mod config;
mod error;
mod headings;
mod mcp;
mod pdf;
mod pipeline;
mod toc_text;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Mcp { config } => {
            let config = config.resolve()?;
            let font = pdf::font::TocFont::register(&config.font_path)
                .with_context(|| "Failed to register TOC font")?;
            let pipeline = pipeline::Pipeline::new(
                pdf::text::PageTextSource::from_config(&config),
                font,
            );
            mcp::run_server(Arc::new(pipeline)).await?;
        }
        Commands::Run {
            input,
            output,
            workers,
            config,
        } => {
            commands::run::run(input, output, workers, &config).await?;
        }
        Commands::Headings { path, config } => {
            commands::headings::run(&path, &config)?;
        }
        Commands::Toc { path, config } => {
            commands::toc::run(&path, &config)?;
        }
        Commands::AddToc {
            path,
            output,
            config,
        } => {
            commands::add_toc::run(&path, &output, &config)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
