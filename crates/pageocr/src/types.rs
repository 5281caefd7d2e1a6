//! Shared data types: language sets, page records, documents and run summaries.

use crate::error::{PageOcrError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Ordered set of language identifiers applied to every page of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Languages(Vec<String>);

impl Languages {
    pub fn new<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes
            .into_iter()
            .map(Into::into)
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect();

        if codes.is_empty() {
            return Err(PageOcrError::validation("at least one language is required"));
        }

        Ok(Self(codes))
    }

    /// Parse a comma-separated list such as `en,de`. Whitespace and empty entries are dropped.
    pub fn parse(list: &str) -> Result<Self> {
        Self::new(list.split(','))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Languages {
    fn default() -> Self {
        Self(vec!["en".to_string()])
    }
}

impl FromStr for Languages {
    type Err = PageOcrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Languages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// One page of OCR output as persisted to disk: `{"ocr": {...}, "page": n}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub ocr: serde_json::Map<String, serde_json::Value>,
    /// 1-based page number matching rasterization order.
    pub page: usize,
}

/// A PDF found by the directory driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDocument {
    pub path: PathBuf,
    /// File name without extension.
    pub name: String,
    /// Name of the directory immediately containing the PDF.
    pub class: String,
}

impl PdfDocument {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| PageOcrError::validation(format!("PDF path has no file name: {}", path.display())))?
            .to_string();

        // `./doc.pdf` has a parent of `.` which carries no name until resolved.
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let class = match parent.file_name() {
            Some(dir) => Some(dir.to_os_string()),
            None => parent
                .canonicalize()
                .ok()
                .and_then(|resolved| resolved.file_name().map(|dir| dir.to_os_string())),
        }
        .and_then(|dir| dir.into_string().ok())
        .ok_or_else(|| {
            PageOcrError::validation(format!(
                "Cannot derive document class from parent directory of {}",
                path.display()
            ))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            name,
            class,
        })
    }

    /// `<output_dir>/<class>/<name>.json`
    pub fn output_path(&self, output_dir: impl AsRef<Path>) -> PathBuf {
        output_dir.as_ref().join(&self.class).join(format!("{}.json", self.name))
    }
}

/// A document that failed under the continue-on-error policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDocument {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a directory run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub found: usize,
    pub processed: usize,
    pub skipped: usize,
    pub pages: usize,
    pub failed: Vec<FailedDocument>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
