//! QR code rendering with the `qrcode` crate.
//!
//! Error correction level M. Modules are scaled by the largest whole factor
//! that fits the tape height (at least 1), so the bitmap is always square.

use image::Rgb;
use qrcode::{EcLevel, QrCode};

use crate::label::{LabelColor, QrWidget};

use super::{Bitmap, QrRenderer, RenderError, blank};

/// Default QR provider.
pub struct QrCodeRenderer;

impl QrRenderer for QrCodeRenderer {
    fn render_qr(
        &self,
        widget: &QrWidget,
        height: u32,
        fg: LabelColor,
        bg: LabelColor,
    ) -> Result<Option<Bitmap>, RenderError> {
        if widget.content.trim().is_empty() {
            return Ok(None);
        }

        let code = QrCode::with_error_correction_level(widget.content.as_bytes(), EcLevel::M)?;
        let modules = code.width();
        let scale = (height as usize / modules).max(1);
        let side = (modules * scale) as u32;

        let mut bitmap = blank(side, side, bg);
        let ink = Rgb(fg.rgb());

        for qy in 0..modules {
            for qx in 0..modules {
                if code[(qx, qy)] != qrcode::Color::Dark {
                    continue;
                }
                for cy in 0..scale {
                    for cx in 0..scale {
                        bitmap.put_pixel((qx * scale + cx) as u32, (qy * scale + cy) as u32, ink);
                    }
                }
            }
        }

        Ok(Some(bitmap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(content: &str, height: u32) -> Result<Option<Bitmap>, RenderError> {
        QrCodeRenderer.render_qr(
            &QrWidget::new(content),
            height,
            LabelColor::Black,
            LabelColor::White,
        )
    }

    #[test]
    fn test_blank_content_renders_nothing() {
        assert!(render("", 64).unwrap().is_none());
        assert!(render("   ", 64).unwrap().is_none());
    }

    #[test]
    fn test_square_and_scaled_to_fit() {
        // "hello" at level M is a 21x21 version 1 symbol
        let bitmap = render("hello", 64).unwrap().unwrap();
        assert_eq!(bitmap.dimensions(), (63, 63));

        let bitmap = render("hello", 32).unwrap().unwrap();
        assert_eq!(bitmap.dimensions(), (21, 21));
    }

    #[test]
    fn test_scale_never_below_one() {
        let bitmap = render("hello", 10).unwrap().unwrap();
        assert_eq!(bitmap.dimensions(), (21, 21));
    }

    #[test]
    fn test_finder_pattern_corner_is_dark() {
        let bitmap = render("hello", 64).unwrap().unwrap();
        assert_eq!(bitmap.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_oversized_content_is_an_error() {
        let huge = "x".repeat(5000);
        assert!(render(&huge, 64).is_err());
    }
}
