//! Collaborator seams: PDF rasterization, model loading and batched inference.
//!
//! The driver in [`crate::core`] works against these traits only. Concrete implementations
//! live in [`crate::pdf`] (pdfium rasterizer) and [`crate::onnx`] (ONNX Runtime engine), each
//! behind its cargo feature.

pub mod bundle;
pub mod ocr;
pub mod rasterizer;

pub use bundle::ModelBundle;
pub use ocr::{InferenceOptions, OcrEngine, ToMapping};
pub use rasterizer::PageRasterizer;
