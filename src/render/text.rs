//! # Text Rendering
//!
//! Multi-line text drawn with the Spleen bitmap fonts, scaled to the line
//! height of the tape.
//!
//! ## Sizing
//!
//! ```text
//! lines       = text lines (a trailing empty line is dropped)
//! line_height = tape_height / lines
//! font_px     = max(4, round(line_height × scale% × 7/8))
//! padding     = 4px + frame width on each side
//! ```
//!
//! The source face is the smallest Spleen size at least as tall as `font_px`
//! (6x12, 8x16 or 12x24), resampled nearest-neighbour to the target height.
//!
//! ## Styles
//!
//! | Style   | Effect |
//! |---------|--------|
//! | regular | as drawn |
//! | bold    | strokes widened by `font_px / 12` (at least 1px) |
//! | italic  | sheared right by 1/5 of the height |
//! | narrow  | glyphs condensed to 3/4 width |

use image::Rgb;
use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

use crate::label::{Alignment, FontStyle, LabelColor, TextWidget};

use super::{Bitmap, RenderError, TextRenderer, blank, check_width};

/// Horizontal padding on both sides of the text, inside the frame.
pub const TEXT_PADDING_PX: u32 = 4;

/// Ratio between the font size and its line box.
const FONT_SIZE_RATIO: f64 = 7.0 / 8.0;

/// Smallest font size drawn.
const MIN_FONT_PX: u32 = 4;

const ITALIC_SLANT: f64 = 0.2;
const NARROW_FACTOR: f64 = 0.75;

/// Default text provider.
pub struct SpleenText;

impl TextRenderer for SpleenText {
    fn render_text(
        &self,
        widget: &TextWidget,
        height: u32,
        fg: LabelColor,
        bg: LabelColor,
    ) -> Result<Option<Bitmap>, RenderError> {
        if widget.text.trim().is_empty() || height == 0 {
            return Ok(None);
        }

        let lines = split_lines(&widget.text);
        let line_height = height as f64 / lines.len() as f64;
        let font_px = font_size(line_height, widget.scale_percent());

        let face = Face::for_size(font_px);
        let masks = lines
            .iter()
            .map(|line| face.render_line(line, font_px, widget.font_style))
            .collect::<Result<Vec<Mask>, _>>()?;

        let frame = widget.frame_width();
        let inset = TEXT_PADDING_PX + frame;
        let inner_width = masks.iter().map(|m| m.width).max().unwrap_or(0);
        let width = check_width(inner_width as u64 + 2 * inset as u64)?;

        let mut bitmap = blank(width, height, bg);
        let ink = Rgb(fg.rgb());

        for (i, mask) in masks.iter().enumerate() {
            let x = inset
                + match widget.align {
                    Alignment::Left => 0,
                    Alignment::Center => (inner_width - mask.width) / 2,
                    Alignment::Right => inner_width - mask.width,
                };
            let top = i as f64 * line_height;
            let y = (top + (line_height - mask.height as f64) / 2.0).max(0.0).floor() as u32;
            mask.paint(&mut bitmap, x, y, ink);
        }

        draw_frame(&mut bitmap, frame, ink);

        Ok(Some(bitmap))
    }
}

/// Split into lines, dropping one trailing empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    if lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Target glyph height for a line box and a scale percentage.
pub fn font_size(line_height: f64, scale_percent: u32) -> u32 {
    let px = (line_height * scale_percent as f64 / 100.0 * FONT_SIZE_RATIO).round();
    (px.max(0.0) as u32).max(MIN_FONT_PX)
}

/// Paint a rectangular frame of `width` pixels inside the bitmap edge.
fn draw_frame(bitmap: &mut Bitmap, width: u32, ink: Rgb<u8>) {
    if width == 0 {
        return;
    }
    let (w, h) = bitmap.dimensions();
    for y in 0..h {
        for x in 0..w {
            if x < width || y < width || x >= w.saturating_sub(width) || y >= h.saturating_sub(width) {
                bitmap.put_pixel(x, y, ink);
            }
        }
    }
}

/// Rasterize a single regular-style line, e.g. a barcode caption.
pub(crate) fn caption(text: &str, font_px: u32) -> Result<Mask, RenderError> {
    Face::for_size(font_px).render_line(text, font_px, FontStyle::Regular)
}

/// A 1-bit coverage mask.
pub(crate) struct Mask {
    pub(crate) width: u32,
    pub(crate) height: u32,
    bits: Vec<bool>,
}

impl Mask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width * height) as usize],
        }
    }

    fn set(&mut self, x: u32, y: u32) {
        if x < self.width && y < self.height {
            self.bits[(y * self.width + x) as usize] = true;
        }
    }

    fn get(&self, x: u32, y: u32) -> bool {
        self.bits[(y * self.width + x) as usize]
    }

    /// Paint set bits onto the bitmap, clipping at its edges.
    pub(crate) fn paint(&self, bitmap: &mut Bitmap, x0: u32, y0: u32, ink: Rgb<u8>) {
        let (bw, bh) = bitmap.dimensions();
        for y in 0..self.height {
            for x in 0..self.width {
                let (px, py) = (x0 + x, y0 + y);
                if px < bw && py < bh && self.get(x, y) {
                    bitmap.put_pixel(px, py, ink);
                }
            }
        }
    }
}

/// One Spleen face plus its cell size.
struct Face {
    data: &'static [u8],
    cell_width: u32,
    cell_height: u32,
}

impl Face {
    fn for_size(font_px: u32) -> Self {
        let (data, cell_width, cell_height): (&'static [u8], u32, u32) = match font_px {
            0..=12 => (&FONT_6X12[..], 6, 12),
            13..=16 => (&FONT_8X16[..], 8, 16),
            _ => (&FONT_12X24[..], 12, 24),
        };
        Self {
            data,
            cell_width,
            cell_height,
        }
    }

    /// Rasterize one line at `font_px` high.
    fn render_line(&self, line: &str, font_px: u32, style: FontStyle) -> Result<Mask, RenderError> {
        let (cw, ch_h) = (self.cell_width, self.cell_height);
        let mut font = PSF2Font::new(self.data)
            .map_err(|_| RenderError::Font(format!("cannot load {cw}x{ch_h} face")))?;

        // Source glyph bits, row-major. Unknown characters become a hollow box.
        let mut glyph = |ch: char| -> Vec<bool> {
            let (w, h) = (cw as usize, ch_h as usize);
            let mut bits = vec![false; w * h];
            let utf8 = ch.to_string();
            match font.glyph_for_utf8(utf8.as_bytes()) {
                Some(glyph) => {
                    for (row_y, row) in glyph.enumerate() {
                        for (col_x, on) in row.enumerate() {
                            if row_y < h && col_x < w {
                                bits[row_y * w + col_x] = on;
                            }
                        }
                    }
                }
                None => {
                    for y in 1..h - 1 {
                        for x in 1..w - 1 {
                            bits[y * w + x] = y == 1 || y == h - 2 || x == 1 || x == w - 2;
                        }
                    }
                }
            }
            bits
        };

        let scale = font_px as f64 / ch_h as f64;
        let width_factor = if style == FontStyle::Narrow { NARROW_FACTOR } else { 1.0 };
        let glyph_width = ((cw as f64 * scale * width_factor).round() as u32).max(1);

        let stroke = if style == FontStyle::Bold { (font_px / 12).max(1) } else { 0 };
        let slant = if style == FontStyle::Italic {
            (font_px as f64 * ITALIC_SLANT).round() as u32
        } else {
            0
        };

        let advance = glyph_width + stroke;
        let count = line.chars().count() as u64;
        let mut mask = Mask::new(check_width(count * advance as u64 + slant as u64)?, font_px);

        for (i, ch) in line.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let src = glyph(ch);
            let origin = i as u32 * advance;
            for oy in 0..font_px {
                let sy = (oy * ch_h / font_px).min(ch_h - 1);
                let shear = if slant > 0 {
                    ((font_px - 1 - oy) as f64 * ITALIC_SLANT).round() as u32
                } else {
                    0
                };
                for ox in 0..glyph_width {
                    let sx = (ox * cw / glyph_width).min(cw - 1);
                    if src[(sy * cw + sx) as usize] {
                        for dx in 0..=stroke {
                            mask.set(origin + ox + shear + dx, oy);
                        }
                    }
                }
            }
        }

        Ok(mask)
    }
}
