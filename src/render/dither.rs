//! # Bayer Ordered Dithering
//!
//! Label printers are two-tone: every pixel is either ink or tape. Photos and
//! logos are reduced to that with an 8x8 Bayer threshold matrix.
//!
//! ```text
//! ink(x, y) = darkness(x, y) > (BAYER8[y % 8][x % 8] + 0.5) / 64
//! ```
//!
//! The matrix is fixed, so the same image always produces the same pixels.

use image::{GrayImage, Rgb};

use crate::label::LabelColor;

use super::Bitmap;

/// Bayer 8x8 threshold matrix (values 0..=63).
pub const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Threshold in `(0, 1)` for a pixel position.
#[inline]
pub fn threshold(x: u32, y: u32) -> f32 {
    (BAYER8[(y & 7) as usize][(x & 7) as usize] as f32 + 0.5) / 64.0
}

/// Whether a pixel of the given darkness (0 = white, 1 = black) gets ink.
#[inline]
pub fn is_ink(x: u32, y: u32, darkness: f32) -> bool {
    darkness > threshold(x, y)
}

/// Dither a grayscale image into label colors.
pub fn dither(gray: &GrayImage, fg: LabelColor, bg: LabelColor) -> Bitmap {
    let ink = Rgb(fg.rgb());
    let tape = Rgb(bg.rgb());
    Bitmap::from_fn(gray.width(), gray.height(), |x, y| {
        let darkness = 1.0 - gray.get_pixel(x, y)[0] as f32 / 255.0;
        if is_ink(x, y, darkness) { ink } else { tape }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_extremes() {
        for y in 0..8 {
            for x in 0..8 {
                assert!(is_ink(x, y, 1.0));
                assert!(!is_ink(x, y, 0.0));
            }
        }
    }

    #[test]
    fn test_half_gray_is_half_ink() {
        let count = (0..8)
            .flat_map(|y| (0..8).map(move |x| (x, y)))
            .filter(|&(x, y)| is_ink(x, y, 0.5))
            .count();
        assert_eq!(count, 32);
    }

    #[test]
    fn test_dither_uses_label_colors() {
        let mut gray = GrayImage::from_pixel(4, 1, Luma([255]));
        gray.put_pixel(0, 0, Luma([0]));
        let out = dither(&gray, LabelColor::Blue, LabelColor::Yellow);
        assert_eq!(out.get_pixel(0, 0).0, LabelColor::Blue.rgb());
        assert_eq!(out.get_pixel(3, 0).0, LabelColor::Yellow.rgb());
    }

    #[test]
    fn test_dither_is_deterministic() {
        let gray = GrayImage::from_fn(16, 16, |x, y| Luma([((x * 16 + y) % 256) as u8]));
        let a = dither(&gray, LabelColor::Black, LabelColor::White);
        let b = dither(&gray, LabelColor::Black, LabelColor::White);
        assert_eq!(a, b);
    }
}
