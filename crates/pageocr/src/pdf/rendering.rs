use super::bindings::bind_pdfium;
use super::error::PdfError;
use crate::engine::PageRasterizer;
use crate::error::{PageOcrError, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

const PDF_POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRenderOptions {
    pub target_dpi: i32,
    pub max_image_dimension: i32,
    pub auto_adjust_dpi: bool,
    pub min_dpi: i32,
    pub max_dpi: i32,
}

impl Default for PageRenderOptions {
    fn default() -> Self {
        Self {
            target_dpi: 96,
            max_image_dimension: 8192,
            auto_adjust_dpi: true,
            min_dpi: 72,
            max_dpi: 300,
        }
    }
}

/// Renders every page of a PDF file to an RGB image through pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    options: PageRenderOptions,
}

impl PdfiumRasterizer {
    pub fn new(options: PageRenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PageRenderOptions {
        &self.options
    }

    /// Render all pages of an in-memory PDF, in document order.
    pub fn render_all_pages(&self, pdf_bytes: &[u8]) -> std::result::Result<Vec<DynamicImage>, PdfError> {
        let pdfium = Pdfium::new(bind_pdfium()?);

        let document = pdfium.load_pdf_from_byte_slice(pdf_bytes, None).map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("password") || err_msg.contains("Password") {
                PdfError::PasswordRequired
            } else {
                PdfError::InvalidPdf(err_msg)
            }
        })?;

        let pages = document.pages();
        let mut images = Vec::with_capacity(pages.len() as usize);

        for (page_index, page) in pages.iter().enumerate() {
            images.push(self.render_page(&page, page_index)?);
        }

        Ok(images)
    }

    fn render_page(&self, page: &PdfPage, page_index: usize) -> std::result::Result<DynamicImage, PdfError> {
        let width_points = page.width().value;
        let height_points = page.height().value;

        check_page_size(page_index, width_points, height_points)?;

        let dpi = if self.options.auto_adjust_dpi {
            calculate_optimal_dpi(
                width_points as f64,
                height_points as f64,
                self.options.target_dpi,
                self.options.max_image_dimension,
                self.options.min_dpi,
                self.options.max_dpi,
            )
        } else {
            self.options.target_dpi
        };

        let scale = dpi as f64 / PDF_POINTS_PER_INCH;

        let config = PdfRenderConfig::new()
            .set_target_width(((width_points * scale as f32) as i32).max(1))
            .set_target_height(((height_points * scale as f32) as i32).max(1))
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PdfError::RenderingFailed(format!("page {}: {}", page_index + 1, e)))?;

        Ok(DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8()))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>> {
        let bytes = std::fs::read(pdf_path)?;

        let images = self
            .render_all_pages(&bytes)
            .map_err(|err| PageOcrError::pdf_with_source(format!("{}: {}", pdf_path.display(), err), err))?;

        tracing::debug!("Rasterized {} pages from {}", images.len(), pdf_path.display());
        Ok(images)
    }
}

/// DPI to render a page at.
///
/// `target_dpi`, lowered if needed so the longer page side stays within `max_dimension` pixels.
/// The `[min_dpi, max_dpi]` bounds are applied last, so `min_dpi` takes precedence over
/// `max_dimension` on very large pages.
fn calculate_optimal_dpi(
    page_width: f64,
    page_height: f64,
    target_dpi: i32,
    max_dimension: i32,
    min_dpi: i32,
    max_dpi: i32,
) -> i32 {
    let longest_side_inches = page_width.max(page_height) / PDF_POINTS_PER_INCH;
    let fitting_dpi = (max_dimension as f64 / longest_side_inches) as i32;

    target_dpi.min(fitting_dpi).max(min_dpi).min(max_dpi)
}

fn check_page_size(page_index: usize, width_points: f32, height_points: f32) -> std::result::Result<(), PdfError> {
    if width_points > 0.0 && height_points > 0.0 {
        return Ok(());
    }
    Err(PdfError::RenderingFailed(format!(
        "page {} has an empty media box ({} x {} points)",
        page_index + 1,
        width_points,
        height_points
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_page_render_options_default() {
        let options = PageRenderOptions::default();
        assert_eq!(options.target_dpi, 96);
        assert!(options.auto_adjust_dpi);
        assert_eq!(options.min_dpi, 72);
        assert_eq!(options.max_dpi, 300);
    }

    #[test]
    fn test_calculate_optimal_dpi_letter_page() {
        assert_eq!(calculate_optimal_dpi(612.0, 792.0, 96, 8192, 72, 300), 96);
    }

    #[test]
    fn test_calculate_optimal_dpi_oversized_page() {
        let dpi = calculate_optimal_dpi(10000.0, 10000.0, 96, 4096, 10, 300);
        assert!(dpi < 96);
        assert!((10000.0 / PDF_POINTS_PER_INCH * dpi as f64) as i32 <= 4096);
    }

    #[test]
    fn test_calculate_optimal_dpi_clamps() {
        assert_eq!(calculate_optimal_dpi(100.0, 100.0, 10, 8192, 72, 300), 72);
        assert_eq!(calculate_optimal_dpi(100.0, 100.0, 1000, 8192, 72, 300), 300);
    }

    #[test]
    fn test_calculate_optimal_dpi_wide_page() {
        let dpi = calculate_optimal_dpi(20000.0, 612.0, 96, 8192, 10, 300);
        assert!((10..96).contains(&dpi));
    }

    #[test]
    fn test_calculate_optimal_dpi_min_dpi_wins_over_max_dimension() {
        assert_eq!(calculate_optimal_dpi(100_000.0, 100.0, 96, 1024, 72, 300), 72);
    }

    #[test]
    fn test_empty_page_is_rendering_failure() {
        assert!(check_page_size(0, 612.0, 792.0).is_ok());

        let err = check_page_size(2, 612.0, 0.0).unwrap_err();
        assert!(matches!(err, PdfError::RenderingFailed(_)));
        assert!(err.to_string().contains("page 3"));
    }

    #[test]
    fn test_rasterize_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let rasterizer = PdfiumRasterizer::default();
        let err = rasterizer.rasterize(&dir.path().join("missing.pdf")).unwrap_err();
        assert!(matches!(err, PageOcrError::Io(_)));
    }

    #[test]
    fn test_custom_options_kept() {
        let options = PageRenderOptions {
            target_dpi: 150,
            auto_adjust_dpi: false,
            ..Default::default()
        };
        let rasterizer = PdfiumRasterizer::new(options.clone());
        assert_eq!(rasterizer.options(), &options);
    }
}
