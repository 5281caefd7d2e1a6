//! pageocr CLI

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pageocr::Languages;
use pageocr::core::{BatchConfig, ConsoleProgress, ErrorPolicy, OcrPipeline, OutputExists, ocr_dir, ocr_file};
use pageocr::onnx::{OnnxEngine, OnnxEngineConfig};
use pageocr::pdf::PdfiumRasterizer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// CLI enum for the per-document error policy
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliErrorPolicy {
    /// Stop at the first document that fails
    Abort,
    /// Report failing documents and keep going
    Continue,
}

impl From<CliErrorPolicy> for ErrorPolicy {
    fn from(policy: CliErrorPolicy) -> Self {
        match policy {
            CliErrorPolicy::Abort => ErrorPolicy::Abort,
            CliErrorPolicy::Continue => ErrorPolicy::Continue,
        }
    }
}

#[derive(Parser)]
#[command(name = "pageocr")]
#[command(about = "OCR directories of PDFs into per-document JSON", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by both commands
#[derive(Args)]
struct RunArgs {
    /// Languages applied to every page (comma-separated)
    #[arg(short, long, default_value = "en")]
    langs: Languages,

    /// Maximum number of pages per inference call
    #[arg(short, long, default_value_t = pageocr::core::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Print total and per-page processing time for each document
    #[arg(long)]
    time_profile: bool,

    /// Directory holding det.onnx, rec.onnx and rec_dict.txt
    #[arg(short, long, default_value = "models")]
    model_dir: PathBuf,

    /// Only print results and warnings
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// OCR every PDF below a directory into <output_dir>/<class>/<name>.json
    ProcessDir {
        /// Directory of class subdirectories holding PDFs
        input_dir: PathBuf,

        /// Directory receiving the JSON results
        output_dir: PathBuf,

        /// What to do when a document fails
        #[arg(long, value_enum, default_value = "abort")]
        on_error: CliErrorPolicy,

        #[command(flatten)]
        run: RunArgs,
    },

    /// OCR one PDF into one JSON file
    ProcessPdf {
        /// PDF to process
        input_pdf: PathBuf,

        /// JSON file to write
        output_json: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },
}

impl RunArgs {
    fn batch_config(&self, error_policy: ErrorPolicy) -> BatchConfig {
        BatchConfig {
            languages: self.langs.clone(),
            batch_size: self.batch_size,
            time_profile: self.time_profile,
            error_policy,
            show_progress: !self.quiet,
        }
    }

    fn pipeline(&self) -> OcrPipeline<OnnxEngine, PdfiumRasterizer> {
        let engine = OnnxEngine::new(OnnxEngineConfig::new(&self.model_dir));
        OcrPipeline::new(engine, PdfiumRasterizer::default())
    }

    fn progress(&self) -> ConsoleProgress {
        if self.quiet {
            ConsoleProgress::quiet()
        } else {
            ConsoleProgress::new()
        }
    }
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::ProcessDir {
            input_dir,
            output_dir,
            on_error,
            run,
        } => {
            init_logging(run.quiet);

            let config = run.batch_config(on_error.into());
            config.validate().context("Invalid options")?;
            tracing::debug!(?config, "Processing directory");

            let pipeline = run.pipeline();
            let summary = ocr_dir(
                &pipeline,
                &input_dir,
                &output_dir,
                &config,
                &OutputExists,
                &run.progress(),
            )
            .with_context(|| format!("Failed to process {}", input_dir.display()))?;

            if !summary.is_success() {
                for failed in &summary.failed {
                    eprintln!("✗ {}: {}", failed.path.display(), failed.error);
                }
                bail!(
                    "{} of {} documents failed ({} processed, {} skipped)",
                    summary.failed.len(),
                    summary.found,
                    summary.processed,
                    summary.skipped
                );
            }

            Ok(())
        }

        Commands::ProcessPdf {
            input_pdf,
            output_json,
            run,
        } => {
            init_logging(run.quiet);

            let config = run.batch_config(ErrorPolicy::Abort);
            config.validate().context("Invalid options")?;
            tracing::debug!(?config, "Processing single PDF");

            if !input_pdf.is_file() {
                bail!("Input PDF not found: {}", input_pdf.display());
            }

            let pipeline = run.pipeline();
            ocr_file(&pipeline, &input_pdf, &output_json, &config, &run.progress())
                .with_context(|| format!("Failed to process {}", input_pdf.display()))?;

            Ok(())
        }
    }
}
