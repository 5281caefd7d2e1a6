use crate::error::Result;
use image::DynamicImage;
use std::path::Path;

/// Converts a PDF into its ordered page images.
///
/// A document with zero pages yields an empty vector; that is not an error.
pub trait PageRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>>;
}

impl<R: PageRasterizer + ?Sized> PageRasterizer for &R {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>> {
        (**self).rasterize(pdf_path)
    }
}
