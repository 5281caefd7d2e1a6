//! In-process stand-ins for the rasterizer and the OCR engine.
#![allow(dead_code)]

use image::DynamicImage;
use pageocr::engine::{InferenceOptions, ModelBundle, OcrEngine, PageRasterizer};
use pageocr::{Languages, PageOcrError, Result};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Page images whose height is this value make [`FakeEngine`] fail.
const POISON_HEIGHT: u32 = 2;

/// Rasterizer keyed by PDF file name. Page `i` is an image `i + 1` pixels wide.
#[derive(Default)]
pub struct FakeRasterizer {
    pages: HashMap<String, usize>,
    broken: HashSet<String>,
    poisoned: HashSet<String>,
    calls: RefCell<Vec<PathBuf>>,
}

impl FakeRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, file_name: &str, pages: usize) -> Self {
        self.pages.insert(file_name.to_string(), pages);
        self
    }

    /// Rasterizing this file fails.
    pub fn with_broken(mut self, file_name: &str) -> Self {
        self.broken.insert(file_name.to_string());
        self
    }

    /// The last page of this file makes inference fail.
    pub fn with_poisoned_last_page(mut self, file_name: &str, pages: usize) -> Self {
        self.pages.insert(file_name.to_string(), pages);
        self.poisoned.insert(file_name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>> {
        self.calls.borrow_mut().push(pdf_path.to_path_buf());

        let name = pdf_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if self.broken.contains(&name) {
            return Err(PageOcrError::pdf(format!("Invalid PDF: {}", name)));
        }

        let pages = self.pages.get(&name).copied().unwrap_or(1);
        let poisoned = self.poisoned.contains(&name);

        Ok((0..pages)
            .map(|i| {
                let height = if poisoned && i + 1 == pages { POISON_HEIGHT } else { 1 };
                DynamicImage::new_luma8(i as u32 + 1, height)
            })
            .collect())
    }
}

#[derive(Debug, Serialize)]
pub struct FakePrediction {
    pub text: String,
    pub languages: Vec<String>,
}

/// How [`FakeEngine`] behaves when its detection model is loaded.
#[derive(Debug, Default, Clone, Copy)]
pub enum LoadBehavior {
    #[default]
    Succeed,
    /// Fails with `PageOcrError::ModelLoad`.
    ModelLoadError,
    /// Fails with a plain `PageOcrError::Io`, as a loader reading a config file would.
    IoError,
    /// Succeeds after sleeping.
    Slow(Duration),
}

/// Engine whose prediction for an image is derived from the image width.
#[derive(Default)]
pub struct FakeEngine {
    pub load: LoadBehavior,
    loads: Cell<usize>,
    batches: RefCell<Vec<usize>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load(load: LoadBehavior) -> Self {
        Self {
            load,
            ..Default::default()
        }
    }

    pub fn failing_load() -> Self {
        Self::with_load(LoadBehavior::ModelLoadError)
    }

    pub fn loads(&self) -> usize {
        self.loads.get()
    }

    /// Sizes of every batch passed to `run_ocr`, in call order.
    pub fn batches(&self) -> Vec<usize> {
        self.batches.borrow().clone()
    }
}

impl OcrEngine for FakeEngine {
    type DetectionModel = ();
    type DetectionProcessor = ();
    type RecognitionModel = ();
    type RecognitionProcessor = ();
    type Prediction = FakePrediction;

    fn name(&self) -> &str {
        "fake"
    }

    fn load_detection_model(&self) -> Result<()> {
        self.loads.set(self.loads.get() + 1);
        match self.load {
            LoadBehavior::Succeed => Ok(()),
            LoadBehavior::ModelLoadError => Err(PageOcrError::model_load("det.onnx missing")),
            LoadBehavior::IoError => Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "det.onnx").into()),
            LoadBehavior::Slow(delay) => {
                std::thread::sleep(delay);
                Ok(())
            }
        }
    }

    fn load_detection_processor(&self) -> Result<()> {
        Ok(())
    }

    fn load_recognition_model(&self) -> Result<()> {
        Ok(())
    }

    fn load_recognition_processor(&self) -> Result<()> {
        Ok(())
    }

    fn run_ocr(
        &self,
        images: &[DynamicImage],
        languages: &[Languages],
        _models: &ModelBundle<Self>,
        _options: &InferenceOptions,
    ) -> Result<Vec<FakePrediction>> {
        self.batches.borrow_mut().push(images.len());

        images
            .iter()
            .zip(languages)
            .map(|(image, langs)| {
                if image.height() == POISON_HEIGHT {
                    return Err(PageOcrError::ocr("inference failed"));
                }
                Ok(FakePrediction {
                    text: format!("w{}", image.width()),
                    languages: langs.as_slice().to_vec(),
                })
            })
            .collect()
    }
}

/// Create empty placeholder PDFs at the given paths below `root`.
pub fn touch_pdfs(root: &Path, relative: &[&str]) {
    for rel in relative {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"%PDF-1.4").unwrap();
    }
}

/// All files below `root`, relative and sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files = Vec::new();
    if !root.exists() {
        return files;
    }
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    files.sort();
    files
}
