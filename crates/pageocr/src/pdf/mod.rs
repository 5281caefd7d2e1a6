//! PDF rasterization through pdfium.
//!
//! The pdfium shared library is bound at runtime from the system library path on the first
//! document that needs it.
//!
//! # Example
//!
//! ```rust,no_run
//! use pageocr::engine::PageRasterizer;
//! use pageocr::pdf::{PageRenderOptions, PdfiumRasterizer};
//! use std::path::Path;
//!
//! # fn example() -> pageocr::Result<()> {
//! let rasterizer = PdfiumRasterizer::new(PageRenderOptions::default());
//! let pages = rasterizer.rasterize(Path::new("document.pdf"))?;
//! println!("{} pages", pages.len());
//! # Ok(())
//! # }
//! ```
mod bindings;
pub mod error;
pub mod rendering;

pub use error::PdfError;
pub use rendering::{PageRenderOptions, PdfiumRasterizer};
