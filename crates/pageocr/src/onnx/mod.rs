//! ONNX Runtime OCR engine.
//!
//! Runs a DB text detector and a CTC text recognizer exported to ONNX (the PaddleOCR model
//! layout). The model directory holds:
//!
//! - `det.onnx` - detection model
//! - `rec.onnx` - recognition model
//! - `rec_dict.txt` - recognition dictionary, one symbol per line
//! - `det_processor.json`, `rec_processor.json` - optional processor overrides
//!
//! Pages are handled one at a time inside a batch. Each detected region is cropped, recognized
//! and kept when the decoded text is not blank.
mod detection;
mod engine;
mod recognition;
mod types;

pub use detection::{DetectionInput, DetectionProcessor, TextRegion, probability_map};
pub use engine::{OnnxEngine, OnnxEngineConfig, OnnxModel};
pub use recognition::{RecognitionProcessor, RecognitionSettings, crop_region};
pub use types::{BBox, OcrPrediction, TextLine};
