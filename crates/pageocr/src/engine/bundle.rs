use super::ocr::OcrEngine;
use crate::error::{PageOcrError, Result};

/// Any loader failure counts as a model load failure, whatever error the engine raised.
fn load_failure(component: &str, engine: &str, err: PageOcrError) -> PageOcrError {
    match err {
        err @ PageOcrError::ModelLoad { .. } => err,
        err => PageOcrError::model_load_with_source(format!("Cannot load {} ({}): {}", component, engine, err), err),
    }
}

/// The four components an [`OcrEngine`] needs for inference.
///
/// Loaded once per process and shared read-only by every batch of every document.
pub struct ModelBundle<E: OcrEngine> {
    pub detection_model: E::DetectionModel,
    pub detection_processor: E::DetectionProcessor,
    pub recognition_model: E::RecognitionModel,
    pub recognition_processor: E::RecognitionProcessor,
}

impl<E: OcrEngine> ModelBundle<E> {
    /// Load all four components. The first failure is returned as `PageOcrError::ModelLoad`;
    /// no partial bundle is kept.
    pub fn load(engine: &E) -> Result<Self> {
        let name = engine.name();
        tracing::info!("📥️ Loading models ({})", name);

        let detection_processor = engine
            .load_detection_processor()
            .map_err(|e| load_failure("detection processor", name, e))?;
        let detection_model = engine
            .load_detection_model()
            .map_err(|e| load_failure("detection model", name, e))?;
        let recognition_model = engine
            .load_recognition_model()
            .map_err(|e| load_failure("recognition model", name, e))?;
        let recognition_processor = engine
            .load_recognition_processor()
            .map_err(|e| load_failure("recognition processor", name, e))?;

        Ok(Self {
            detection_model,
            detection_processor,
            recognition_model,
            recognition_processor,
        })
    }
}

impl<E: OcrEngine> std::fmt::Debug for ModelBundle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle").finish_non_exhaustive()
    }
}
