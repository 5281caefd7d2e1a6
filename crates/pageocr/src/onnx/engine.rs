use super::detection::{DetectionProcessor, TextRegion, probability_map};
use super::recognition::{RecognitionProcessor, crop_region};
use super::types::{OcrPrediction, TextLine};
use crate::engine::{InferenceOptions, ModelBundle, OcrEngine};
use crate::error::{PageOcrError, Result};
use crate::types::Languages;
use image::DynamicImage;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the ONNX engine finds its files and how it runs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnnxEngineConfig {
    pub model_dir: PathBuf,
    /// File names below `model_dir`.
    pub detection_model: String,
    pub recognition_model: String,
    pub dictionary: String,
    pub detection_processor: String,
    pub recognition_processor: String,
    pub intra_threads: usize,
}

impl OnnxEngineConfig {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            detection_model: "det.onnx".to_string(),
            recognition_model: "rec.onnx".to_string(),
            dictionary: "rec_dict.txt".to_string(),
            detection_processor: "det_processor.json".to_string(),
            recognition_processor: "rec_processor.json".to_string(),
            intra_threads: 4,
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.model_dir.join(file)
    }
}

impl Default for OnnxEngineConfig {
    fn default() -> Self {
        Self::new("models")
    }
}

fn load_error(path: &Path, err: impl std::fmt::Display) -> PageOcrError {
    PageOcrError::model_load(format!("{}: {}", path.display(), err))
}

/// An ONNX Runtime session. Running needs exclusive access, hence the lock.
pub struct OnnxModel {
    session: Mutex<Session>,
    path: PathBuf,
}

impl OnnxModel {
    pub fn load(path: &Path, intra_threads: usize) -> Result<Self> {
        if !path.is_file() {
            return Err(PageOcrError::model_load(format!("Model file not found: {}", path.display())));
        }

        tracing::info!("Loading ONNX model from {}", path.display());

        let session = Session::builder()
            .map_err(|e| load_error(path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_error(path, e))?
            .with_intra_threads(intra_threads.max(1))
            .map_err(|e| load_error(path, e))?
            .commit_from_file(path)
            .map_err(|e| load_error(path, e))?;

        Ok(Self {
            session: Mutex::new(session),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run_error(&self, err: impl std::fmt::Display) -> PageOcrError {
        PageOcrError::ocr(format!("{}: {}", self.path.display(), err))
    }

    /// Run a single `[1, 3, height, width]` input; returns the first output's shape and data.
    fn run(&self, data: Vec<f32>, height: u32, width: u32) -> Result<(Vec<usize>, Vec<f32>)> {
        let input = Tensor::from_array(([1_usize, 3, height as usize, width as usize], data.into_boxed_slice()))
            .map_err(|e| self.run_error(e))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input]).map_err(|e| self.run_error(e))?;
        let (shape, values) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| self.run_error(e))?;

        let shape = shape.iter().map(|&d| d.max(0) as usize).collect();
        Ok((shape, values.to_vec()))
    }
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel").field("path", &self.path).finish_non_exhaustive()
    }
}

/// Text detection + recognition on ONNX Runtime.
///
/// Expects a DB text detector emitting a `[1, 1, h, w]` probability map and a CTC recognizer
/// emitting `[1, steps, classes]` probabilities, as exported by PaddleOCR.
#[derive(Debug, Clone)]
pub struct OnnxEngine {
    config: OnnxEngineConfig,
}

impl OnnxEngine {
    pub fn new(config: OnnxEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OnnxEngineConfig {
        &self.config
    }

    fn detect(
        &self,
        page: &DynamicImage,
        model: &OnnxModel,
        processor: &DetectionProcessor,
    ) -> Result<Vec<TextRegion>> {
        let input = processor.prepare(page);
        let (shape, values) = model.run(input.data, input.height, input.width)?;

        let [.., height, width] = shape[..] else {
            return Err(PageOcrError::ocr(format!("Unexpected detector output shape {:?}", shape)));
        };
        let probabilities = probability_map(&values, height, width)?;

        Ok(processor.postprocess(probabilities.view(), page.width(), page.height()))
    }

    fn recognize(
        &self,
        crop: &DynamicImage,
        model: &OnnxModel,
        processor: &RecognitionProcessor,
    ) -> Result<(String, f32)> {
        let (data, width) = processor.prepare(crop);
        let (shape, values) = model.run(data, processor.settings.image_height, width)?;

        let [_, steps, classes] = shape[..] else {
            return Err(PageOcrError::ocr(format!("Unexpected recognizer output shape {:?}", shape)));
        };
        processor.decode(&values, steps, classes)
    }
}

impl OcrEngine for OnnxEngine {
    type DetectionModel = OnnxModel;
    type DetectionProcessor = DetectionProcessor;
    type RecognitionModel = OnnxModel;
    type RecognitionProcessor = RecognitionProcessor;
    type Prediction = OcrPrediction;

    fn name(&self) -> &str {
        "onnx"
    }

    fn load_detection_model(&self) -> Result<OnnxModel> {
        OnnxModel::load(&self.config.path(&self.config.detection_model), self.config.intra_threads)
    }

    fn load_detection_processor(&self) -> Result<DetectionProcessor> {
        DetectionProcessor::from_file(&self.config.path(&self.config.detection_processor))
    }

    fn load_recognition_model(&self) -> Result<OnnxModel> {
        OnnxModel::load(&self.config.path(&self.config.recognition_model), self.config.intra_threads)
    }

    fn load_recognition_processor(&self) -> Result<RecognitionProcessor> {
        RecognitionProcessor::from_files(
            &self.config.path(&self.config.dictionary),
            &self.config.path(&self.config.recognition_processor),
        )
    }

    fn run_ocr(
        &self,
        images: &[DynamicImage],
        languages: &[Languages],
        models: &ModelBundle<Self>,
        options: &InferenceOptions,
    ) -> Result<Vec<OcrPrediction>> {
        if images.len() != languages.len() {
            return Err(PageOcrError::ocr(format!(
                "{} images but {} language sets",
                images.len(),
                languages.len()
            )));
        }

        let mut predictions = Vec::with_capacity(images.len());

        for (index, (page, langs)) in images.iter().zip(languages).enumerate() {
            models.recognition_processor.check_languages(langs)?;

            let regions = self.detect(page, &models.detection_model, &models.detection_processor)?;

            let mut text_lines = Vec::with_capacity(regions.len());
            for region in &regions {
                let Some(crop) = crop_region(page, &region.bbox) else {
                    continue;
                };
                let (text, confidence) =
                    self.recognize(&crop, &models.recognition_model, &models.recognition_processor)?;
                if text.trim().is_empty() {
                    continue;
                }
                text_lines.push(TextLine::new(region.bbox, text, confidence));
            }

            if options.show_progress {
                tracing::info!(
                    "Recognized {} lines ({} regions) in image {}/{}",
                    text_lines.len(),
                    regions.len(),
                    index + 1,
                    images.len()
                );
            }

            predictions.push(OcrPrediction {
                text_lines,
                languages: langs.as_slice().to_vec(),
                image_bbox: [0.0, 0.0, page.width() as f32, page.height() as f32],
            });
        }

        Ok(predictions)
    }
}
