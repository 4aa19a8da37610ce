//! # Barcode Rendering
//!
//! 1D symbologies encoded with the `barcoders` crate.
//!
//! | Tag                    | Encoding |
//! |------------------------|----------|
//! | code128                | Code 128 (set C for even-length digits, otherwise set B) |
//! | code39                 | Code 39, upper-cased |
//! | codabar                | Codabar, wrapped in `A…A` when no start/stop is given |
//! | ean13                  | EAN-13 from 12 digits, or 13 with a valid check digit |
//! | ean8                   | EAN-8 from 7 digits, or 8 with a valid check digit |
//! | upc, upca              | UPC-A (EAN-13 with a leading zero) |
//! | itf                    | Interleaved 2 of 5, even digit count |
//! | ean, ean14, gs1, gs1_128, isbn, isbn10, isbn13 | Code 128 |
//!
//! Each module is 2px wide, with no quiet zone (label margins provide it).
//! With `showText`, the bars take 60% of the height and the content is
//! printed centered beneath them.

use barcoders::sym::codabar::Codabar;
use barcoders::sym::code39::Code39;
use barcoders::sym::code128::Code128;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::tf::TF;
use image::Rgb;

use crate::label::{BarcodeType, BarcodeWidget, LabelColor};

use super::text::caption;
use super::{BarcodeRenderer, Bitmap, RenderError, blank, check_width};

/// Pixel width of one barcode module.
pub const MODULE_WIDTH_PX: u32 = 2;

/// Share of the height used by bars when a caption is shown.
const BARS_WITH_TEXT_RATIO: f64 = 0.6;

/// Caption size as a share of the height.
const CAPTION_RATIO: f64 = 0.2;
const MIN_CAPTION_PX: u32 = 8;

/// Default barcode provider.
pub struct LinearBarcode;

impl BarcodeRenderer for LinearBarcode {
    fn render_barcode(
        &self,
        widget: &BarcodeWidget,
        height: u32,
        fg: LabelColor,
        bg: LabelColor,
    ) -> Result<Option<Bitmap>, RenderError> {
        let content = widget.content.trim();
        if content.is_empty() || height == 0 {
            return Ok(None);
        }

        let modules = encode(widget.barcode_type, content)?;
        if modules.is_empty() {
            return Ok(None);
        }

        let bars_width = check_width(modules.len() as u64 * MODULE_WIDTH_PX as u64)?;

        let bars_height = if widget.show_text {
            (height as f64 * BARS_WITH_TEXT_RATIO).round() as u32
        } else {
            height
        };

        let caption = if widget.show_text {
            let font_px = ((height as f64 * CAPTION_RATIO).round() as u32).max(MIN_CAPTION_PX);
            Some(caption(content, font_px)?)
        } else {
            None
        };

        let width = bars_width.max(caption.as_ref().map_or(0, |c| c.width));

        let mut bitmap = blank(width, height, bg);
        let ink = Rgb(fg.rgb());

        let bars_x = (width - bars_width) / 2;
        for (i, _) in modules.iter().enumerate().filter(|&(_, &m)| m == 1) {
            let x0 = bars_x + i as u32 * MODULE_WIDTH_PX;
            for x in x0..x0 + MODULE_WIDTH_PX {
                for y in 0..bars_height {
                    bitmap.put_pixel(x, y, ink);
                }
            }
        }

        if let Some(caption) = caption {
            let x = (width - caption.width) / 2;
            let room = height.saturating_sub(bars_height);
            let y = bars_height + room.saturating_sub(caption.height) / 2;
            caption.paint(&mut bitmap, x, y, ink);
        }

        Ok(Some(bitmap))
    }
}

/// Encode content into modules (`1` = bar).
pub fn encode(barcode_type: BarcodeType, content: &str) -> Result<Vec<u8>, RenderError> {
    match barcode_type {
        BarcodeType::Code39 => Code39::new(content.to_uppercase())
            .map(|b| b.encode())
            .map_err(symbology_error("Code 39")),
        BarcodeType::Codabar => {
            let wrapped = if content.starts_with(|c: char| matches!(c.to_ascii_uppercase(), 'A'..='D')) {
                content.to_uppercase()
            } else {
                format!("A{content}A")
            };
            Codabar::new(wrapped)
                .map(|b| b.encode())
                .map_err(symbology_error("Codabar"))
        }
        BarcodeType::Ean13 => {
            let data = checked_digits(content, 12)?;
            EAN13::new(data).map(|b| b.encode()).map_err(symbology_error("EAN-13"))
        }
        BarcodeType::Ean8 => {
            let data = checked_digits(content, 7)?;
            EAN8::new(data).map(|b| b.encode()).map_err(symbology_error("EAN-8"))
        }
        BarcodeType::Upc | BarcodeType::Upca => {
            let data = checked_digits(content, 11)?;
            EAN13::new(format!("0{data}"))
                .map(|b| b.encode())
                .map_err(symbology_error("UPC-A"))
        }
        BarcodeType::Itf => {
            if !all_digits(content) || content.len() % 2 != 0 {
                return Err(RenderError::Barcode(
                    "ITF needs an even number of digits".to_string(),
                ));
            }
            TF::interleaved(content)
                .map(|b| b.encode())
                .map_err(symbology_error("ITF"))
        }
        BarcodeType::Code128
        | BarcodeType::Ean
        | BarcodeType::Ean14
        | BarcodeType::Gs1
        | BarcodeType::Gs1128
        | BarcodeType::Isbn
        | BarcodeType::Isbn10
        | BarcodeType::Isbn13 => encode_code128(content),
    }
}

fn encode_code128(content: &str) -> Result<Vec<u8>, RenderError> {
    // Ć selects character set C (digit pairs), Ɓ set B (printable ASCII).
    let prefixed = if all_digits(content) && content.len() % 2 == 0 {
        format!("\u{0106}{content}")
    } else {
        format!("\u{0181}{content}")
    };
    Code128::new(prefixed)
        .map(|b| b.encode())
        .map_err(symbology_error("Code 128"))
}

fn symbology_error<E: std::fmt::Debug>(name: &'static str) -> impl Fn(E) -> RenderError {
    move |e| RenderError::Barcode(format!("invalid {name} content: {e:?}"))
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// GS1 mod-10 check digit for a digit string.
pub fn check_digit(digits: &str) -> u32 {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = (b - b'0') as u32;
            if i % 2 == 0 { d * 3 } else { d }
        })
        .sum();
    (10 - sum % 10) % 10
}

/// Accept `len` data digits, or `len + 1` digits ending in a correct check
/// digit. Returns the data digits.
fn checked_digits(content: &str, len: usize) -> Result<&str, RenderError> {
    if !all_digits(content) {
        return Err(RenderError::Barcode("content must be digits".to_string()));
    }
    if content.len() == len {
        return Ok(content);
    }
    if content.len() == len + 1 {
        let (data, check) = content.split_at(len);
        if check_digit(data).to_string() == check {
            return Ok(data);
        }
        return Err(RenderError::Barcode(format!("bad check digit in {content}")));
    }
    Err(RenderError::Barcode(format!(
        "expected {len} or {} digits, got {}",
        len + 1,
        content.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(barcode_type: BarcodeType, content: &str, show_text: bool) -> Result<Option<Bitmap>, RenderError> {
        let mut widget = BarcodeWidget::new(barcode_type, content);
        widget.show_text = show_text;
        LinearBarcode.render_barcode(&widget, 64, LabelColor::Black, LabelColor::White)
    }

    #[test]
    fn test_check_digit() {
        assert_eq!(check_digit("400638133393"), 1);
        assert_eq!(check_digit("9638507"), 4);
        assert_eq!(check_digit("03600029145"), 2);
    }

    #[test]
    fn test_blank_content_renders_nothing() {
        assert!(render(BarcodeType::Code128, "  ", false).unwrap().is_none());
    }

    #[test]
    fn test_code128_bars_span_full_height() {
        let bitmap = render(BarcodeType::Code128, "Hello", false).unwrap().unwrap();
        assert_eq!(bitmap.height(), 64);
        assert_eq!(bitmap.width() % MODULE_WIDTH_PX, 0);
        // a Code 128 symbol starts with a bar
        assert_eq!(bitmap.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(bitmap.get_pixel(0, 63).0, [0, 0, 0]);
    }

    #[test]
    fn test_show_text_shortens_bars() {
        let bitmap = render(BarcodeType::Code128, "Hello", true).unwrap().unwrap();
        assert_eq!(bitmap.height(), 64);
        // bars stop at 60% of the height
        let bars_x = (0..bitmap.width())
            .find(|&x| bitmap.get_pixel(x, 0).0 == [0, 0, 0])
            .unwrap();
        assert_eq!(bitmap.get_pixel(bars_x, 37).0, [0, 0, 0]);
        assert_eq!(bitmap.get_pixel(bars_x, 38).0, [255, 255, 255]);
        // caption ink below the bars
        let caption_ink = (38..64)
            .flat_map(|y| (0..bitmap.width()).map(move |x| (x, y)))
            .any(|(x, y)| bitmap.get_pixel(x, y).0 == [0, 0, 0]);
        assert!(caption_ink);
    }

    #[test]
    fn test_ean13_accepts_with_or_without_check_digit() {
        let a = encode(BarcodeType::Ean13, "400638133393").unwrap();
        let b = encode(BarcodeType::Ean13, "4006381333931").unwrap();
        assert_eq!(a, b);
        assert!(encode(BarcodeType::Ean13, "4006381333930").is_err());
        assert!(encode(BarcodeType::Ean13, "12AB").is_err());
    }

    #[test]
    fn test_upca_is_ean13_with_leading_zero() {
        let upc = encode(BarcodeType::Upca, "03600029145").unwrap();
        let ean = encode(BarcodeType::Ean13, "003600029145").unwrap();
        assert_eq!(upc, ean);
    }

    #[test]
    fn test_invalid_content_is_an_error() {
        assert!(render(BarcodeType::Itf, "123", false).is_err());
        assert!(render(BarcodeType::Ean8, "123", false).is_err());
    }

    #[test]
    fn test_code39_accepts_lowercase() {
        assert!(render(BarcodeType::Code39, "abc-123", false).unwrap().is_some());
    }

    #[test]
    fn test_unmapped_types_use_code128() {
        assert_eq!(
            encode(BarcodeType::Gs1128, "ABC").unwrap(),
            encode(BarcodeType::Code128, "ABC").unwrap()
        );
    }

    #[test]
    fn test_overlong_content_is_refused() {
        let content = "A".repeat(5_000);
        assert!(matches!(
            render(BarcodeType::Code128, &content, false),
            Err(RenderError::TooWide(_))
        ));
    }
}
