//! Single-document OCR runner.
//!
//! [`OcrPipeline`] owns the engine, the rasterizer and the lazily loaded model bundle. The
//! bundle is loaded on the first call that needs it and then reused for every batch of every
//! document handled by the same pipeline.

use super::config::BatchConfig;
use super::driver::display_name;
use super::progress::ProgressSink;
use crate::engine::{InferenceOptions, ModelBundle, OcrEngine, PageRasterizer, ToMapping};
use crate::error::{PageOcrError, Result};
use crate::types::PageRecord;
use once_cell::unsync::OnceCell;
use std::path::Path;

pub struct OcrPipeline<E: OcrEngine, R: PageRasterizer> {
    engine: E,
    rasterizer: R,
    models: OnceCell<ModelBundle<E>>,
}

impl<E: OcrEngine, R: PageRasterizer> OcrPipeline<E, R> {
    pub fn new(engine: E, rasterizer: R) -> Self {
        Self {
            engine,
            rasterizer,
            models: OnceCell::new(),
        }
    }

    /// Build a pipeline around an already loaded bundle.
    pub fn with_models(engine: E, rasterizer: R, models: ModelBundle<E>) -> Self {
        Self {
            engine,
            rasterizer,
            models: OnceCell::with_value(models),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Whether the model bundle has been loaded yet.
    pub fn models_loaded(&self) -> bool {
        self.models.get().is_some()
    }

    /// The model bundle, loading it on first use.
    ///
    /// A failed load leaves the pipeline without a bundle; the next call tries again.
    pub fn models(&self) -> Result<&ModelBundle<E>> {
        self.models.get_or_try_init(|| ModelBundle::load(&self.engine))
    }

    /// OCR every page of one PDF.
    ///
    /// Pages are sent to the engine in consecutive batches of at most `config.batch_size`
    /// images, each image paired with the run's language set. The returned records are in page
    /// order and numbered from 1.
    ///
    /// # Errors
    ///
    /// - `PageOcrError::Validation` for an invalid `config`
    /// - `PageOcrError::ModelLoad` if the bundle cannot be loaded
    /// - `PageOcrError::Pdf` (or whatever the rasterizer returns) if rasterization fails
    /// - `PageOcrError::Ocr` if inference fails or returns the wrong number of predictions
    /// - `PageOcrError::Serialization` if a prediction is not a JSON object
    ///
    /// Nothing is returned for a document that fails part-way.
    #[tracing::instrument(skip_all, fields(pdf = %pdf_path.display()))]
    pub fn ocr_pdf(
        &self,
        pdf_path: &Path,
        config: &BatchConfig,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<Vec<PageRecord>> {
        config.validate()?;
        let models = self.models()?;

        let images = self.rasterizer.rasterize(pdf_path)?;

        let file_name = display_name(pdf_path);
        let description = format!("⚙️ {} [{} pages]", file_name, images.len());
        match progress {
            Some(progress) => progress.describe(&description),
            None => tracing::info!("{}", description),
        }

        let options = InferenceOptions {
            show_progress: config.show_progress,
        };

        let mut predictions = Vec::with_capacity(images.len());
        for (index, batch) in images.chunks(config.batch_size).enumerate() {
            let languages = vec![config.languages.clone(); batch.len()];

            tracing::debug!(
                batch = index,
                images = batch.len(),
                languages = %config.languages,
                "Running OCR batch for {}",
                file_name
            );

            let batch_predictions = self.engine.run_ocr(batch, &languages, models, &options)?;
            if batch_predictions.len() != batch.len() {
                return Err(PageOcrError::ocr(format!(
                    "{} returned {} predictions for a batch of {} images ({}, batch {})",
                    self.engine.name(),
                    batch_predictions.len(),
                    batch.len(),
                    file_name,
                    index
                )));
            }

            predictions.extend(batch_predictions);
        }

        predictions
            .iter()
            .enumerate()
            .map(|(index, prediction)| -> Result<PageRecord> {
                Ok(PageRecord {
                    ocr: prediction.to_mapping()?,
                    page: index + 1,
                })
            })
            .collect()
    }
}

impl<E: OcrEngine, R: PageRasterizer> std::fmt::Debug for OcrPipeline<E, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrPipeline")
            .field("engine", &self.engine.name())
            .field("models_loaded", &self.models_loaded())
            .finish_non_exhaustive()
    }
}
