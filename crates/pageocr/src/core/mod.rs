//! Batch orchestration: configuration, discovery, per-document OCR and output.

pub mod config;
pub mod driver;
pub mod io;
pub mod marker;
pub mod pipeline;
pub mod progress;

pub use config::{BatchConfig, DEFAULT_BATCH_SIZE, ErrorPolicy};
pub use driver::{ocr_dir, ocr_file, timing_line};
pub use io::{find_pdfs, read_records, write_records};
pub use marker::{CompletionMarker, MemoryMarker, OutputExists};
pub use pipeline::OcrPipeline;
pub use progress::{CollectProgress, ConsoleProgress, NoProgress, ProgressSink};
