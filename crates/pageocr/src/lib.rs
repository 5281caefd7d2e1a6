//! pageocr - batch OCR for directories of PDFs
//!
//! pageocr walks a tree of PDFs, rasterizes every page, runs text detection and recognition
//! over the pages in fixed-size batches and writes one JSON file per document. Documents whose
//! output already exists are skipped, so an interrupted run can simply be started again.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pageocr::core::{BatchConfig, ConsoleProgress, OcrPipeline, OutputExists, ocr_dir};
//! use pageocr::onnx::{OnnxEngine, OnnxEngineConfig};
//! use pageocr::pdf::PdfiumRasterizer;
//! use std::path::Path;
//!
//! # fn main() -> pageocr::Result<()> {
//! let engine = OnnxEngine::new(OnnxEngineConfig::new("models"));
//! let pipeline = OcrPipeline::new(engine, PdfiumRasterizer::default());
//!
//! let summary = ocr_dir(
//!     &pipeline,
//!     Path::new("in"),
//!     Path::new("out"),
//!     &BatchConfig::default(),
//!     &OutputExists,
//!     &ConsoleProgress::new(),
//! )?;
//! println!("processed {} documents", summary.processed);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): directory driver, single-document runner, completion markers,
//!   configuration and JSON output
//! - **Engine seams** (`engine`): `PageRasterizer`, `OcrEngine` and the `ModelBundle`
//! - **PDF** (`pdf`, feature `pdf`): pdfium rasterizer
//! - **ONNX** (`onnx`, feature `onnx`): ONNX Runtime text detection + recognition engine
//!
//! # Output
//!
//! Each document becomes `<output_dir>/<class>/<name>.json`, where `class` is the name of the
//! directory holding the PDF. The file is a JSON array of `{"ocr": {...}, "page": n}` records
//! with pages numbered from 1.

#![deny(unsafe_code)]

pub mod core;
pub mod engine;
pub mod error;
pub mod timer;
pub mod types;

#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(feature = "pdf")]
pub mod pdf;

pub use error::{PageOcrError, Result};
pub use types::*;

pub use core::{
    BatchConfig, CompletionMarker, ErrorPolicy, OcrPipeline, OutputExists, ProgressSink, ocr_dir, ocr_file,
};
pub use engine::{InferenceOptions, ModelBundle, OcrEngine, PageRasterizer, ToMapping};
