//! CTC text recognition: line crops, normalization, greedy decoding.

use super::types::BBox;
use crate::error::{PageOcrError, Result};
use crate::types::Languages;
use image::DynamicImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Index of the CTC blank symbol in the model's output classes.
const BLANK: usize = 0;

/// Recognition preprocessing parameters, overridable through `rec_processor.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// Height every line crop is resized to.
    pub image_height: u32,
    /// Upper bound on the resized crop width.
    pub max_width: u32,
    /// Languages the dictionary covers. Empty accepts any language.
    pub supported_languages: Vec<String>,
    /// Append a space symbol after the dictionary entries.
    pub use_space_char: bool,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            image_height: 48,
            max_width: 3200,
            supported_languages: vec!["en".to_string()],
            use_space_char: true,
        }
    }
}

/// Settings plus the character dictionary that maps output classes to text.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionProcessor {
    pub settings: RecognitionSettings,
    /// `charset[i]` is the text for class `i`; class 0 is the blank.
    charset: Vec<String>,
}

impl RecognitionProcessor {
    pub fn new(settings: RecognitionSettings, dictionary: &str) -> Result<Self> {
        let mut charset = vec![String::new()];
        charset.extend(
            dictionary
                .lines()
                .map(|line| line.trim_end_matches('\r'))
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
        if settings.use_space_char {
            charset.push(" ".to_string());
        }

        if charset.len() == 1 {
            return Err(PageOcrError::model_load("Recognition dictionary is empty"));
        }
        if settings.image_height == 0 || settings.max_width == 0 {
            return Err(PageOcrError::model_load("image_height and max_width must be > 0"));
        }

        Ok(Self { settings, charset })
    }

    /// Load the dictionary and optional settings overrides.
    pub fn from_files(dictionary_path: &Path, settings_path: &Path) -> Result<Self> {
        let dictionary = std::fs::read_to_string(dictionary_path).map_err(|e| {
            PageOcrError::model_load_with_source(
                format!("Cannot read recognition dictionary {}", dictionary_path.display()),
                e,
            )
        })?;

        let settings = if settings_path.exists() {
            let content = std::fs::read_to_string(settings_path).map_err(|e| {
                PageOcrError::model_load_with_source(format!("Cannot read {}", settings_path.display()), e)
            })?;
            serde_json::from_str(&content).map_err(|e| {
                PageOcrError::model_load_with_source(format!("Invalid {}", settings_path.display()), e)
            })?
        } else {
            RecognitionSettings::default()
        };

        Self::new(settings, &dictionary)
    }

    /// Number of output classes the recognition model must produce, blank included.
    pub fn num_classes(&self) -> usize {
        self.charset.len()
    }

    /// Reject languages the dictionary does not cover.
    pub fn check_languages(&self, languages: &Languages) -> Result<()> {
        let supported = &self.settings.supported_languages;
        if supported.is_empty() {
            return Ok(());
        }

        for language in languages.as_slice() {
            if !supported.iter().any(|s| s.eq_ignore_ascii_case(language)) {
                return Err(PageOcrError::ocr(format!(
                    "Unsupported language '{}'. Supported: {}",
                    language,
                    supported.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Width of a crop after resizing it to `image_height`, keeping the aspect ratio.
    pub fn resized_width(&self, width: u32, height: u32) -> u32 {
        let scaled = (self.settings.image_height as u64 * width as u64).div_ceil(height.max(1) as u64);
        scaled.clamp(1, self.settings.max_width as u64) as u32
    }

    /// Normalized CHW data for one line crop, with its resized width.
    pub fn prepare(&self, crop: &DynamicImage) -> (Vec<f32>, u32) {
        let height = self.settings.image_height;
        let width = self.resized_width(crop.width(), crop.height());
        let resized = imageops::resize(&crop.to_rgb8(), width, height, FilterType::Triangle);

        let plane = (width * height) as usize;
        let mut data = vec![0.0_f32; 3 * plane];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let offset = (y * width + x) as usize;
            for c in 0..3 {
                data[c * plane + offset] = (pixel[c] as f32 / 255.0 - 0.5) / 0.5;
            }
        }

        (data, width)
    }

    /// Greedy CTC decoding of `[steps, classes]` probabilities.
    ///
    /// Repeated classes collapse, blanks are dropped. The confidence is the mean probability of
    /// the emitted characters, or 0 when nothing is emitted.
    pub fn decode(&self, probabilities: &[f32], steps: usize, classes: usize) -> Result<(String, f32)> {
        if classes != self.charset.len() {
            return Err(PageOcrError::ocr(format!(
                "Recognition model emits {} classes but the dictionary has {}",
                classes,
                self.charset.len()
            )));
        }
        if probabilities.len() != steps * classes {
            return Err(PageOcrError::ocr(format!(
                "Recognition output has {} values, expected {} x {}",
                probabilities.len(),
                steps,
                classes
            )));
        }

        let mut text = String::new();
        let mut scores = Vec::new();
        let mut previous = None;

        for step in probabilities.chunks_exact(classes) {
            let (index, score) = step
                .iter()
                .copied()
                .enumerate()
                .fold((BLANK, f32::MIN), |best, (i, p)| if p > best.1 { (i, p) } else { best });

            if index != BLANK && previous != Some(index) {
                text.push_str(&self.charset[index]);
                scores.push(score);
            }
            previous = Some(index);
        }

        let confidence = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f32>() / scores.len() as f32
        };

        Ok((text, confidence))
    }
}

/// Cut a text region out of a page, clamped to the page bounds.
pub fn crop_region(page: &DynamicImage, bbox: &BBox) -> Option<DynamicImage> {
    let x0 = bbox[0].max(0.0).floor() as u32;
    let y0 = bbox[1].max(0.0).floor() as u32;
    let x1 = (bbox[2].ceil() as u32).min(page.width());
    let y1 = (bbox[3].ceil() as u32).min(page.height());

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(page.crop_imm(x0, y0, x1 - x0, y1 - y0))
}
