use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::pdf::text::TextOrigin;
use crate::pipeline::{detect_headings, FileOutcome, Pipeline};
use crate::toc_text::format_toc;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddTocRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Clone)]
pub struct TocServer {
    pipeline: Arc<Pipeline>,
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for TocServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TocServer")
            .field("font", &self.pipeline.font.path())
            .finish_non_exhaustive()
    }
}

impl TocServer {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl TocServer {
    #[tool(description = "Detect section headings in a PDF. Pages without embedded text are OCR'd. Returns headings with 1-based page numbers")]
    fn pdf_headings(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match detect_headings(&self.pipeline.source, Path::new(&path)) {
            Ok(detection) => {
                let pages_of = |origin: TextOrigin| -> Vec<u32> {
                    detection
                        .pages
                        .iter()
                        .filter(|p| p.origin == origin)
                        .map(|p| p.page)
                        .collect()
                };
                let result = HeadingsResult {
                    page_count: detection.pages.len() as u32,
                    ocr_pages: pages_of(TextOrigin::Ocr),
                    pages_without_text: pages_of(TextOrigin::Degraded),
                    headings: detection
                        .headings
                        .iter()
                        .map(|h| HeadingResult {
                            text: h.text.clone(),
                            page: h.page,
                        })
                        .collect(),
                    path,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Get the dot-leadered table of contents text that would be prepended to a PDF")]
    fn pdf_toc_text(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match detect_headings(&self.pipeline.source, Path::new(&path)) {
            Ok(detection) => {
                let result = TocTextResult {
                    lines: detection.headings.len(),
                    toc: format_toc(&detection.headings),
                    path,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Detect headings in a PDF and save a copy with a generated table of contents prepended. Nothing is written when no headings are found")]
    fn pdf_add_toc(&self, Parameters(req): Parameters<AddTocRequest>) -> String {
        let outcome = self
            .pipeline
            .process_file(Path::new(&req.path), Path::new(&req.output));

        let result = match outcome {
            FileOutcome::Written {
                headings,
                toc_pages,
            } => AddTocResult {
                output_path: Some(req.output),
                headings,
                toc_pages,
            },
            FileOutcome::NoHeadings => AddTocResult {
                output_path: None,
                headings: 0,
                toc_pages: 0,
            },
            FileOutcome::Skipped(reason) => return format!("Error: {}", reason),
        };
        serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HeadingResult {
    pub text: String,
    pub page: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HeadingsResult {
    pub path: String,
    pub page_count: u32,
    pub ocr_pages: Vec<u32>,
    pub pages_without_text: Vec<u32>,
    pub headings: Vec<HeadingResult>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TocTextResult {
    pub path: String,
    pub lines: usize,
    pub toc: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AddTocResult {
    pub output_path: Option<String>,
    pub headings: usize,
    pub toc_pages: usize,
}

impl ServerHandler for TocServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Table of contents tools for PDFs. Use pdf_headings to see which lines are \
                 detected as section headings, pdf_toc_text to preview the generated table of \
                 contents, and pdf_add_toc to write a copy of the PDF with the table of \
                 contents prepended."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(pipeline: Arc<Pipeline>) -> Result<()> {
    let server = TocServer::new(pipeline);

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
