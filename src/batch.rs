use crate::pipeline::{FileOutcome, Pipeline};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub written: usize,
    pub no_headings: usize,
    pub skipped: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Written { .. } => self.written += 1,
            FileOutcome::NoHeadings => self.no_headings += 1,
            FileOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.written + self.no_headings + self.skipped
    }
}

/// Every regular file under `root` whose name ends in lowercase `.pdf`.
pub fn discover_pdfs<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Failed to read directory entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".pdf"))
        .map(|entry| entry.into_path())
        .collect()
}

/// Where `input` lands when `input_root` is mirrored into `output_root`.
pub fn mirrored_path(input_root: &Path, output_root: &Path, input: &Path) -> Option<PathBuf> {
    input
        .strip_prefix(input_root)
        .ok()
        .map(|relative| output_root.join(relative))
}

/// Process every PDF under `input_root` on at most `workers` blocking threads
/// and wait for all of them. Per-file failures only show up in the report.
pub async fn process_directory(
    pipeline: Arc<Pipeline>,
    input_root: &Path,
    output_root: &Path,
    workers: usize,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_root)
        .with_context(|| format!("Failed to create directory: {}", output_root.display()))?;

    let files = discover_pdfs(input_root);
    info!(
        files = files.len(),
        workers,
        "Processing {}",
        input_root.display()
    );

    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();
    let mut report = BatchReport::default();

    for input in files {
        let Some(output) = mirrored_path(input_root, output_root, &input) else {
            warn!("Skipping {}: not under {}", input.display(), input_root.display());
            report.skipped += 1;
            continue;
        };

        if let Some(parent) = output.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create directory {}: {}", parent.display(), e);
                report.skipped += 1;
                continue;
            }
        }

        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .context("Worker pool closed")?;
        let pipeline = Arc::clone(&pipeline);
        tasks.spawn_blocking(move || {
            let _permit = permit;
            pipeline.process_file(&input, &output)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => report.record(&outcome),
            Err(e) => {
                warn!("Worker task failed: {}", e);
                report.skipped += 1;
            }
        }
    }

    info!(
        written = report.written,
        no_headings = report.no_headings,
        skipped = report.skipped,
        "Batch finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::tests::write_sample_pdf;
    use crate::pdf::PdfDocument;
    use crate::pipeline::tests::pipeline;

    #[test]
    fn test_discovery_is_recursive_and_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("sub/deeper")).unwrap();
        std::fs::write(root.join("a.pdf"), b"").unwrap();
        std::fs::write(root.join("sub/b.pdf"), b"").unwrap();
        std::fs::write(root.join("sub/deeper/c.pdf"), b"").unwrap();
        std::fs::write(root.join("upper.PDF"), b"").unwrap();
        std::fs::write(root.join("notes.txt"), b"").unwrap();
        std::fs::create_dir_all(root.join("folder.pdf")).unwrap();

        let found = discover_pdfs(root);
        let relative: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("sub/b.pdf"),
                PathBuf::from("sub/deeper/c.pdf"),
            ]
        );
    }

    #[test]
    fn test_mirrored_path() {
        assert_eq!(
            mirrored_path(
                Path::new("train"),
                Path::new("output"),
                Path::new("train/sub/doc.pdf")
            ),
            Some(PathBuf::from("output/sub/doc.pdf"))
        );
        assert_eq!(
            mirrored_path(Path::new("train"), Path::new("output"), Path::new("elsewhere/doc.pdf")),
            None
        );
    }

    #[test]
    fn test_report_counts() {
        let mut report = BatchReport::default();
        report.record(&FileOutcome::Written {
            headings: 2,
            toc_pages: 1,
        });
        report.record(&FileOutcome::NoHeadings);
        report.record(&FileOutcome::Skipped("broken".to_string()));
        report.record(&FileOutcome::NoHeadings);
        assert_eq!(
            report,
            BatchReport {
                written: 1,
                no_headings: 2,
                skipped: 1,
            }
        );
        assert_eq!(report.total(), 4);
    }

    #[tokio::test]
    async fn test_mirrors_directory_structure() {
        let Some(pipeline) = pipeline(&["ГЛАВА ПЕРВАЯ\nтекст", "текст"], None) else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let input_root = dir.path().join("in");
        let output_root = dir.path().join("out");
        write_sample_pdf(&input_root.join("sub/doc.pdf"), &["PAGE ONE", "PAGE TWO"]);
        write_sample_pdf(&input_root.join("top.pdf"), &["PAGE ONE", "PAGE TWO"]);

        let report = process_directory(Arc::new(pipeline), &input_root, &output_root, 2)
            .await
            .unwrap();
        assert_eq!(report.written, 2);

        let mirrored = output_root.join("sub/doc.pdf");
        assert!(mirrored.exists());
        assert_eq!(PdfDocument::open(&mirrored).unwrap().page_count(), 3);
        assert!(output_root.join("top.pdf").exists());
    }

    #[tokio::test]
    async fn test_lowercase_only_input_produces_no_file() {
        let Some(pipeline) = pipeline(&["только строчный текст\nбез заголовков"], None) else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let input_root = dir.path().join("in");
        let output_root = dir.path().join("out");
        write_sample_pdf(&input_root.join("sub/plain.pdf"), &["body text"]);

        let report = process_directory(Arc::new(pipeline), &input_root, &output_root, 1)
            .await
            .unwrap();
        assert_eq!(report.no_headings, 1);
        assert_eq!(report.written, 0);
        assert!(!output_root.join("sub/plain.pdf").exists());
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_batch() {
        let Some(pipeline) = pipeline(&["ГЛАВА ПЕРВАЯ"], None) else { return };
        let dir = tempfile::tempdir().unwrap();
        let input_root = dir.path().join("in");
        let output_root = dir.path().join("out");
        std::fs::create_dir_all(&input_root).unwrap();
        std::fs::write(input_root.join("a_broken.pdf"), b"garbage").unwrap();
        write_sample_pdf(&input_root.join("b_good.pdf"), &["PAGE ONE"]);
        std::fs::write(input_root.join("c_broken.pdf"), b"garbage").unwrap();

        let report = process_directory(Arc::new(pipeline), &input_root, &output_root, 4)
            .await
            .unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(report.skipped, 2);
        assert!(output_root.join("b_good.pdf").exists());
        assert!(!output_root.join("a_broken.pdf").exists());
    }

    #[tokio::test]
    async fn test_empty_input_directory() {
        let Some(pipeline) = pipeline(&[], None) else { return };
        let dir = tempfile::tempdir().unwrap();
        let input_root = dir.path().join("in");
        std::fs::create_dir_all(&input_root).unwrap();
        let output_root = dir.path().join("out");

        let report = process_directory(Arc::new(pipeline), &input_root, &output_root, 1)
            .await
            .unwrap();
        assert_eq!(report.total(), 0);
        assert!(output_root.is_dir());
    }
}
