//! Label composition: paint widget bitmaps onto one canvas at their layout
//! positions.

use std::io::Cursor;

use image::Rgb;
use serde::Serialize;

use crate::error::LabelError;
use crate::label::{LabelSettings, Widget};
use crate::layout::LayoutResult;

use super::{Bitmap, blank};

/// Dash pattern for margin guides, in pixels.
const GUIDE_DASH_PX: u32 = 4;
const GUIDE_COLOR: [u8; 3] = [0xff, 0x00, 0x00];
const GUIDE_ALPHA: f32 = 0.5;

/// What the composed image is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposeMode {
    /// On-screen preview; margin guides are drawn when enabled.
    Preview,
    /// Bitmap sent to a printer; never carries guides.
    Payload,
}

/// A fully composed label, ready for a print sink.
#[derive(Debug, Clone)]
pub struct RenderedLabel {
    /// Widgets after variable substitution.
    pub widgets: Vec<Widget>,
    pub layout: LayoutResult,
    pub image: Bitmap,
}

impl RenderedLabel {
    pub fn to_png(&self) -> Result<Vec<u8>, LabelError> {
        encode_png(&self.image)
    }
}

/// Paint `bitmaps` (indexed like the widgets the layout was built from).
///
/// Bitmaps are clipped at the canvas edge.
pub fn compose(
    layout: &LayoutResult,
    bitmaps: &[Option<Bitmap>],
    settings: &LabelSettings,
    mode: ComposeMode,
) -> Bitmap {
    let mut canvas = blank(layout.width, layout.height, settings.background_color);

    for placement in &layout.placements {
        let Some(Some(bitmap)) = bitmaps.get(placement.index) else {
            continue;
        };
        for (x, y, pixel) in bitmap.enumerate_pixels() {
            let (cx, cy) = (placement.x + x, placement.y + y);
            if cx < canvas.width() && cy < canvas.height() {
                canvas.put_pixel(cx, cy, *pixel);
            }
        }
    }

    if mode == ComposeMode::Preview
        && let Some((left, right)) = layout.guides
    {
        draw_guide(&mut canvas, left);
        draw_guide(&mut canvas, right);
    }

    canvas
}

/// Dashed vertical line blended over the canvas.
fn draw_guide(canvas: &mut Bitmap, x: u32) {
    if x >= canvas.width() {
        return;
    }
    for y in 0..canvas.height() {
        if (y / GUIDE_DASH_PX) % 2 != 0 {
            continue;
        }
        let Rgb(base) = *canvas.get_pixel(x, y);
        let blended: [u8; 3] = std::array::from_fn(|i| {
            (base[i] as f32 * (1.0 - GUIDE_ALPHA) + GUIDE_COLOR[i] as f32 * GUIDE_ALPHA).round() as u8
        });
        canvas.put_pixel(x, y, Rgb(blended));
    }
}

/// Encode a bitmap as PNG.
pub fn encode_png(bitmap: &Bitmap) -> Result<Vec<u8>, LabelError> {
    let mut png_bytes = Vec::new();
    bitmap.write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)?;
    Ok(png_bytes)
}
