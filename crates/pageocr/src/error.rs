//! Error types for pageocr.
//!
//! All fallible operations return [`PageOcrError`]. The error model follows two rules:
//!
//! **System errors bubble up unchanged:**
//! - `PageOcrError::Io` (from `std::io::Error`) covers directory listing, existence checks,
//!   output directory creation and JSON writes. These are never wrapped.
//!
//! **Application errors carry context:**
//! - `Pdf` - rasterization failures for a given document
//! - `ModelLoad` - the OCR engine could not load one of its four components
//! - `Ocr` - the batched inference call failed or broke the one-prediction-per-image contract
//! - `Validation` - invalid configuration (batch size, languages, paths)
//! - `Serialization` - predictions that cannot be turned into a JSON mapping
//!
//! # Example
//!
//! ```rust
//! use pageocr::{PageOcrError, Result};
//!
//! fn batch_size_from(raw: &str) -> Result<usize> {
//!     let size: usize = raw
//!         .parse()
//!         .map_err(|e| PageOcrError::validation_with_source(format!("Invalid batch size '{}'", raw), e))?;
//!     if size == 0 {
//!         return Err(PageOcrError::validation("batch size must be > 0"));
//!     }
//!     Ok(size)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `PageOcrError`.
pub type Result<T> = std::result::Result<T, PageOcrError>;

/// Main error type for all pageocr operations.
#[derive(Debug, Error)]
pub enum PageOcrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {message}")]
    Pdf {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Model load error: {message}")]
    ModelLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for PageOcrError {
    fn from(err: serde_json::Error) -> Self {
        PageOcrError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "pdf")]
impl From<crate::pdf::error::PdfError> for PageOcrError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        PageOcrError::Pdf {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl PageOcrError {
    error_constructor!(pdf, Pdf);
    error_constructor!(model_load, ModelLoad);
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PageOcrError = io_err.into();
        assert!(matches!(err, PageOcrError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_pdf_error() {
        let err = PageOcrError::pdf("cannot open document");
        assert_eq!(err.to_string(), "PDF error: cannot open document");
    }

    #[test]
    fn test_model_load_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "det.onnx");
        let err = PageOcrError::model_load_with_source("detection model missing", source);
        assert_eq!(err.to_string(), "Model load error: detection model missing");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_ocr_error() {
        let err = PageOcrError::ocr("inference failed");
        assert_eq!(err.to_string(), "OCR error: inference failed");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_validation_error() {
        let err = PageOcrError::validation("batch size must be > 0");
        assert_eq!(err.to_string(), "Validation error: batch size must be > 0");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: PageOcrError = json_err.into();
        assert!(matches!(err, PageOcrError::Serialization { .. }));
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    #[cfg(feature = "pdf")]
    fn test_pdf_error_conversion() {
        let pdf_err = crate::pdf::error::PdfError::InvalidPdf("corrupt header".to_string());
        let err: PageOcrError = pdf_err.into();
        assert!(matches!(err, PageOcrError::Pdf { .. }));
        assert_eq!(err.to_string(), "PDF error: Invalid PDF: corrupt header");
    }

    #[test]
    fn test_other_error() {
        let err = PageOcrError::Other("unexpected".to_string());
        assert_eq!(err.to_string(), "unexpected");
    }

    #[test]
    fn test_io_error_bubbles_unchanged() {
        fn read_missing() -> Result<Vec<u8>> {
            Ok(std::fs::read("/nonexistent/document.pdf")?)
        }

        assert!(matches!(read_missing().unwrap_err(), PageOcrError::Io(_)));
    }
}
