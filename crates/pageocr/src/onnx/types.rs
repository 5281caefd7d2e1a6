use serde::{Deserialize, Serialize};

/// Axis-aligned box `[x0, y0, x1, y1]` in page pixel coordinates.
pub type BBox = [f32; 4];

/// One recognized line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Corners clockwise from top-left.
    pub polygon: [[f32; 2]; 4],
    pub bbox: BBox,
    pub text: String,
    /// Mean per-character probability of the decoded text.
    pub confidence: f32,
}

impl TextLine {
    pub fn new(bbox: BBox, text: String, confidence: f32) -> Self {
        let [x0, y0, x1, y1] = bbox;
        Self {
            polygon: [[x0, y0], [x1, y0], [x1, y1], [x0, y1]],
            bbox,
            text,
            confidence,
        }
    }
}

/// OCR result for one page image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPrediction {
    /// Lines in reading order: top to bottom, then left to right.
    pub text_lines: Vec<TextLine>,
    pub languages: Vec<String>,
    /// `[0, 0, width, height]` of the page image.
    pub image_bbox: BBox,
}

impl OcrPrediction {
    /// All line texts joined by newlines.
    pub fn text(&self) -> String {
        self.text_lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
