//! DB text detection: preprocessing and probability-map postprocessing.

use super::types::BBox;
use crate::error::{PageOcrError, Result};
use image::DynamicImage;
use image::imageops::{self, FilterType};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// Side lengths fed to the detector are multiples of this.
const SIDE_MULTIPLE: u32 = 32;

/// Detection pre/post-processing parameters.
///
/// Defaults match the PaddleOCR DB detector exports. Any field may be overridden by a
/// `det_processor.json` next to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionProcessor {
    /// Longest side after resizing.
    pub limit_side_len: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
    /// Probability above which a pixel counts as text.
    pub thresh: f32,
    /// Minimum mean probability of a kept region.
    pub box_thresh: f32,
    /// How far a region is grown back out, relative to area over perimeter.
    pub unclip_ratio: f32,
    /// Regions with a shorter side (in detector pixels) are dropped.
    pub min_size: f32,
    pub max_candidates: usize,
}

impl Default for DetectionProcessor {
    fn default() -> Self {
        Self {
            limit_side_len: 960,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
            thresh: 0.3,
            box_thresh: 0.6,
            unclip_ratio: 1.5,
            min_size: 3.0,
            max_candidates: 1000,
        }
    }
}

/// Normalized CHW tensor data for one page.
#[derive(Debug, Clone)]
pub struct DetectionInput {
    pub data: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

/// A detected text region in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion {
    pub bbox: BBox,
    pub score: f32,
}

/// Connected set of text pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Component {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
    pub pixels: Vec<(usize, usize)>,
}

impl DetectionProcessor {
    /// Load overrides from `path`, falling back to defaults when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            PageOcrError::model_load_with_source(format!("Cannot read {}", path.display()), e)
        })?;
        let processor: Self = serde_json::from_str(&content)
            .map_err(|e| PageOcrError::model_load_with_source(format!("Invalid {}", path.display()), e))?;
        processor.validate()?;
        Ok(processor)
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit_side_len < SIDE_MULTIPLE {
            return Err(PageOcrError::model_load(format!(
                "limit_side_len must be at least {}",
                SIDE_MULTIPLE
            )));
        }
        if !(0.0..1.0).contains(&self.thresh) || !(0.0..=1.0).contains(&self.box_thresh) {
            return Err(PageOcrError::model_load("thresh and box_thresh must be within [0, 1]"));
        }
        if self.std.iter().any(|s| *s <= 0.0) {
            return Err(PageOcrError::model_load("std values must be positive"));
        }
        Ok(())
    }

    /// Detector input size for a page of `width` x `height`.
    pub fn resized_dims(&self, width: u32, height: u32) -> (u32, u32) {
        let longest = width.max(height).max(1);
        let ratio = if longest > self.limit_side_len {
            self.limit_side_len as f32 / longest as f32
        } else {
            1.0
        };

        let round = |side: u32| {
            let scaled = (side as f32 * ratio / SIDE_MULTIPLE as f32).round() as u32 * SIDE_MULTIPLE;
            scaled.max(SIDE_MULTIPLE)
        };

        (round(width), round(height))
    }

    pub fn prepare(&self, image: &DynamicImage) -> DetectionInput {
        let (width, height) = self.resized_dims(image.width(), image.height());
        let resized = imageops::resize(&image.to_rgb8(), width, height, FilterType::Triangle);

        let plane = (width * height) as usize;
        let mut data = vec![0.0_f32; 3 * plane];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let offset = (y * width + x) as usize;
            for c in 0..3 {
                data[c * plane + offset] = (pixel[c] as f32 / 255.0 - self.mean[c]) / self.std[c];
            }
        }

        DetectionInput { data, width, height }
    }

    /// Turn the detector's probability map into text regions scaled to the original page.
    pub fn postprocess(&self, probabilities: ArrayView2<f32>, page_width: u32, page_height: u32) -> Vec<TextRegion> {
        let (map_height, map_width) = probabilities.dim();
        if map_height == 0 || map_width == 0 {
            return Vec::new();
        }

        let mask = probabilities.mapv(|p| p > self.thresh);
        let scale_x = page_width as f32 / map_width as f32;
        let scale_y = page_height as f32 / map_height as f32;

        let mut regions = Vec::new();
        for component in connected_components(mask.view()).into_iter().take(self.max_candidates) {
            let box_width = (component.max_x - component.min_x + 1) as f32;
            let box_height = (component.max_y - component.min_y + 1) as f32;
            if box_width.min(box_height) < self.min_size {
                continue;
            }

            let score = component
                .pixels
                .iter()
                .map(|&(y, x)| probabilities[[y, x]])
                .sum::<f32>()
                / component.pixels.len() as f32;
            if score < self.box_thresh {
                continue;
            }

            let grown = unclip(
                [
                    component.min_x as f32,
                    component.min_y as f32,
                    component.max_x as f32 + 1.0,
                    component.max_y as f32 + 1.0,
                ],
                self.unclip_ratio,
            );
            if (grown[2] - grown[0]).min(grown[3] - grown[1]) < self.min_size + 2.0 {
                continue;
            }

            let bbox = [
                (grown[0] * scale_x).clamp(0.0, page_width as f32),
                (grown[1] * scale_y).clamp(0.0, page_height as f32),
                (grown[2] * scale_x).clamp(0.0, page_width as f32),
                (grown[3] * scale_y).clamp(0.0, page_height as f32),
            ];
            regions.push(TextRegion { bbox, score });
        }

        sort_reading_order(&mut regions);
        regions
    }
}

/// Build a probability map from raw `[1, 1, h, w]` detector output.
pub fn probability_map(data: &[f32], height: usize, width: usize) -> Result<Array2<f32>> {
    Array2::from_shape_vec((height, width), data.to_vec())
        .map_err(|e| PageOcrError::ocr_with_source("Detector output does not match its shape", e))
}

/// 4-connected components of a binary mask, in row-major order of their first pixel.
pub(crate) fn connected_components(mask: ArrayView2<bool>) -> Vec<Component> {
    let (height, width) = mask.dim();
    let mut visited = Array2::from_elem((height, width), false);
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            if !mask[[y, x]] || visited[[y, x]] {
                continue;
            }

            let mut component = Component {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                pixels: Vec::new(),
            };
            visited[[y, x]] = true;
            queue.push_back((y, x));

            while let Some((cy, cx)) = queue.pop_front() {
                component.pixels.push((cy, cx));
                component.min_x = component.min_x.min(cx);
                component.max_x = component.max_x.max(cx);
                component.min_y = component.min_y.min(cy);
                component.max_y = component.max_y.max(cy);

                let neighbours = [
                    (cy.wrapping_sub(1), cx),
                    (cy + 1, cx),
                    (cy, cx.wrapping_sub(1)),
                    (cy, cx + 1),
                ];
                for (ny, nx) in neighbours {
                    if ny < height && nx < width && mask[[ny, nx]] && !visited[[ny, nx]] {
                        visited[[ny, nx]] = true;
                        queue.push_back((ny, nx));
                    }
                }
            }

            components.push(component);
        }
    }

    components
}

/// Grow a box on every side by `area * ratio / perimeter`.
pub(crate) fn unclip(bbox: BBox, ratio: f32) -> BBox {
    let width = bbox[2] - bbox[0];
    let height = bbox[3] - bbox[1];
    let perimeter = 2.0 * (width + height);
    if perimeter <= 0.0 {
        return bbox;
    }

    let distance = width * height * ratio / perimeter;
    [
        bbox[0] - distance,
        bbox[1] - distance,
        bbox[2] + distance,
        bbox[3] + distance,
    ]
}

/// Top to bottom; regions whose tops are within half a line height are ordered left to right.
pub(crate) fn sort_reading_order(regions: &mut [TextRegion]) {
    regions.sort_by(|a, b| a.bbox[1].total_cmp(&b.bbox[1]).then(a.bbox[0].total_cmp(&b.bbox[0])));

    for i in 1..regions.len() {
        let mut j = i;
        while j > 0 {
            let (prev, cur) = (&regions[j - 1], &regions[j]);
            let line_height = (prev.bbox[3] - prev.bbox[1]).max(1.0);
            if (cur.bbox[1] - prev.bbox[1]).abs() < line_height / 2.0 && cur.bbox[0] < prev.bbox[0] {
                regions.swap(j - 1, j);
                j -= 1;
            } else {
                break;
            }
        }
    }
}
