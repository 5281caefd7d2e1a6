//! OCR engine trait.
//!
//! An engine supplies the four model components and the batched inference call. The
//! components are opaque to the rest of the crate: the driver only loads them once through
//! [`ModelBundle::load`](super::ModelBundle::load) and hands them back on every call.

use super::bundle::ModelBundle;
use crate::error::{PageOcrError, Result};
use crate::types::Languages;
use image::DynamicImage;
use serde::Serialize;
use serde_json::{Map, Value};

/// Per-call switches passed explicitly into every inference call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InferenceOptions {
    /// Whether the engine may emit its own progress output for the call.
    pub show_progress: bool,
}

/// Conversion of a prediction into a plain JSON mapping.
///
/// Implemented for every `Serialize` type whose serialized form is a JSON object.
pub trait ToMapping {
    fn to_mapping(&self) -> Result<Map<String, Value>>;
}

impl<T: Serialize> ToMapping for T {
    fn to_mapping(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(PageOcrError::serialization(format!(
                "OCR prediction must serialize to a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Text detection + recognition engine.
///
/// # Example
///
/// ```rust
/// use image::DynamicImage;
/// use pageocr::engine::{InferenceOptions, ModelBundle, OcrEngine};
/// use pageocr::{Languages, Result};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Size { width: u32, height: u32 }
///
/// struct SizeEngine;
///
/// impl OcrEngine for SizeEngine {
///     type DetectionModel = ();
///     type DetectionProcessor = ();
///     type RecognitionModel = ();
///     type RecognitionProcessor = ();
///     type Prediction = Size;
///
///     fn name(&self) -> &str { "size" }
///     fn load_detection_model(&self) -> Result<()> { Ok(()) }
///     fn load_detection_processor(&self) -> Result<()> { Ok(()) }
///     fn load_recognition_model(&self) -> Result<()> { Ok(()) }
///     fn load_recognition_processor(&self) -> Result<()> { Ok(()) }
///
///     fn run_ocr(
///         &self,
///         images: &[DynamicImage],
///         _languages: &[Languages],
///         _models: &ModelBundle<Self>,
///         _options: &InferenceOptions,
///     ) -> Result<Vec<Size>> {
///         Ok(images.iter().map(|im| Size { width: im.width(), height: im.height() }).collect())
///     }
/// }
/// ```
pub trait OcrEngine {
    type DetectionModel;
    type DetectionProcessor;
    type RecognitionModel;
    type RecognitionProcessor;
    type Prediction: ToMapping;

    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn load_detection_model(&self) -> Result<Self::DetectionModel>;

    fn load_detection_processor(&self) -> Result<Self::DetectionProcessor>;

    fn load_recognition_model(&self) -> Result<Self::RecognitionModel>;

    fn load_recognition_processor(&self) -> Result<Self::RecognitionProcessor>;

    /// Run detection and recognition over a batch of page images.
    ///
    /// `languages` holds one language set per image. Implementations must return exactly one
    /// prediction per input image, in input order.
    fn run_ocr(
        &self,
        images: &[DynamicImage],
        languages: &[Languages],
        models: &ModelBundle<Self>,
        options: &InferenceOptions,
    ) -> Result<Vec<Self::Prediction>>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Prediction {
        text: String,
        confidence: f32,
    }

    #[test]
    fn test_struct_to_mapping() {
        let prediction = Prediction {
            text: "hello".to_string(),
            confidence: 0.5,
        };
        let map = prediction.to_mapping().unwrap();
        assert_eq!(map["text"], "hello");
        assert_eq!(map["confidence"], 0.5);
    }

    #[test]
    fn test_map_to_mapping() {
        let mut lines = BTreeMap::new();
        lines.insert("lines", vec!["a", "b"]);
        let map = lines.to_mapping().unwrap();
        assert_eq!(map["lines"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = vec![1, 2, 3].to_mapping().unwrap_err();
        assert!(matches!(err, PageOcrError::Serialization { .. }));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_inference_options_default() {
        assert!(!InferenceOptions::default().show_progress);
    }
}
