//! Directory batch driver and the single-file entry point.

use super::config::{BatchConfig, ErrorPolicy};
use super::io::{find_pdfs, write_records};
use super::marker::CompletionMarker;
use super::pipeline::OcrPipeline;
use super::progress::ProgressSink;
use crate::engine::{OcrEngine, PageRasterizer};
use crate::error::{PageOcrError, Result};
use crate::timer::{Elapsed, catch_time};
use crate::types::{FailedDocument, PdfDocument, RunSummary};
use std::path::Path;

/// Format the per-document timing line, e.g. `a: ⏳️ Done in: 2.000 seconds [~1.000s per page]`.
pub fn timing_line(file_name: &str, elapsed: &Elapsed, pages: usize) -> String {
    match elapsed.per_item(pages) {
        Some(per_page) => format!("{}: {} [~{:.3}s per page]", file_name, elapsed.readout(), per_page),
        None => format!("{}: {} [no pages]", file_name, elapsed.readout()),
    }
}

/// File name without its extension, as shown in progress output.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// OCR one PDF and write its records to `output_json`.
///
/// Returns the number of pages written. With `config.time_profile` set, the timing line is
/// sent to `progress` as a report. Model loading happens before the clock starts, so the
/// timing covers rasterization and inference only.
pub fn ocr_file<E, R>(
    pipeline: &OcrPipeline<E, R>,
    input_pdf: &Path,
    output_json: &Path,
    config: &BatchConfig,
    progress: &dyn ProgressSink,
) -> Result<usize>
where
    E: OcrEngine,
    R: PageRasterizer,
{
    config.validate()?;
    pipeline.models()?;

    let (records, elapsed) = catch_time(|| pipeline.ocr_pdf(input_pdf, config, Some(progress)));
    let records = records?;

    if config.time_profile {
        progress.report(&timing_line(&display_name(input_pdf), &elapsed, records.len()));
    }

    write_records(output_json, &records)?;
    tracing::info!("Wrote {} pages to {}", records.len(), output_json.display());

    Ok(records.len())
}

/// OCR every PDF of an input tree into `<output_dir>/<class>/<name>.json`.
///
/// Documents the `marker` reports complete are skipped without touching the engine. A failing
/// document either stops the run or is recorded in the summary, depending on
/// `config.error_policy`. A model load failure always stops the run.
///
/// # Errors
///
/// - `PageOcrError::Validation` for an invalid `config` or an input path that is not a directory
/// - any document error under [`ErrorPolicy::Abort`]
/// - `PageOcrError::ModelLoad` under either policy
/// - errors raised by the `marker`
#[tracing::instrument(skip_all, fields(input = %input_dir.display(), output = %output_dir.display()))]
pub fn ocr_dir<E, R>(
    pipeline: &OcrPipeline<E, R>,
    input_dir: &Path,
    output_dir: &Path,
    config: &BatchConfig,
    marker: &dyn CompletionMarker,
    progress: &dyn ProgressSink,
) -> Result<RunSummary>
where
    E: OcrEngine,
    R: PageRasterizer,
{
    config.validate()?;

    let pdfs = find_pdfs(input_dir)?;
    let mut summary = RunSummary {
        found: pdfs.len(),
        ..Default::default()
    };

    if pdfs.is_empty() {
        tracing::info!("📚️ No PDFs found in {}", input_dir.display());
        return Ok(summary);
    }
    tracing::info!("📚️ Found {} PDFs", pdfs.len());

    for path in pdfs {
        let document = PdfDocument::from_path(&path)?;
        let target = document.output_path(output_dir);

        if marker.is_complete(&target)? {
            tracing::info!("Skipping {}: {} exists", path.display(), target.display());
            summary.skipped += 1;
            continue;
        }

        progress.describe(&format!("⚙️ {} ({})", document.name, document.class));

        match ocr_file(pipeline, &document.path, &target, config, progress) {
            Ok(pages) => {
                marker.mark_complete(&target)?;
                summary.processed += 1;
                summary.pages += pages;
            }
            Err(err @ PageOcrError::ModelLoad { .. }) => return Err(err),
            Err(err) => match config.error_policy {
                ErrorPolicy::Abort => return Err(err),
                ErrorPolicy::Continue => {
                    tracing::warn!("Failed to process {}: {}", path.display(), err);
                    summary.failed.push(FailedDocument {
                        path: path.clone(),
                        error: err.to_string(),
                    });
                }
            },
        }
    }

    tracing::info!(
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed.len(),
        pages = summary.pages,
        "Run complete"
    );

    Ok(summary)
}
