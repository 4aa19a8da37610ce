//! Image widget rendering.
//!
//! The referenced upload is loaded through an [`ImageStore`], flattened onto
//! white, scaled to the tape height (aspect ratio preserved) and reduced to
//! the two label colors with [Bayer dithering](super::dither).

use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};

use crate::label::{ImageWidget, LabelColor};
use crate::uploads::ImageStore;

use super::dither::dither;
use super::{Bitmap, ImageRenderer, RenderError, check_width};

/// Default image provider.
pub struct DitheredImage {
    store: Arc<dyn ImageStore>,
}

impl DitheredImage {
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store }
    }
}

impl ImageRenderer for DitheredImage {
    fn render_image(
        &self,
        widget: &ImageWidget,
        height: u32,
        fg: LabelColor,
        bg: LabelColor,
    ) -> Result<Option<Bitmap>, RenderError> {
        if widget.filename.trim().is_empty() || height == 0 {
            return Ok(None);
        }

        let Some(bytes) = self.store.load(&widget.filename)? else {
            tracing::debug!(filename = %widget.filename, "image not found");
            return Ok(None);
        };

        let source = image::load_from_memory(&bytes)?;
        if source.width() == 0 || source.height() == 0 {
            return Ok(None);
        }

        let width = (source.width() as f64 * height as f64 / source.height() as f64).round() as u64;
        let width = check_width(width.max(1))?;
        let gray = flatten_to_gray(&source);
        let scaled = image::imageops::resize(&gray, width, height, FilterType::Triangle);

        Ok(Some(dither(&scaled, fg, bg)))
    }
}

/// Composite over white and convert to luma.
pub fn flatten_to_gray(source: &DynamicImage) -> GrayImage {
    let rgba = source.to_rgba8();
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as f32 / 255.0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        let over_white = luma * alpha + 255.0 * (1.0 - alpha);
        Luma([over_white.round().clamp(0.0, 255.0) as u8])
    })
}
