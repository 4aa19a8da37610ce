//! # Tape Geometry
//!
//! Physical constants of the label printer head and the supported tape widths.
//!
//! ## Supported Tapes
//!
//! | Tape | Printable height |
//! |------|------------------|
//! | 6mm  | 32 px |
//! | 9mm  | 48 px |
//! | 12mm | 64 px |
//! | 19mm | 96 px |
//!
//! ## Calculations
//!
//! ```text
//! dots_per_mm = dpi / 25.4
//!
//! At 180 DPI:
//!   dots_per_mm = 180 / 25.4 ≈ 7.087
//!   50mm label  ≈ 354 px
//! ```

use serde::{Deserialize, Serialize};

/// Print head resolution in dots per inch.
pub const DPI: f64 = 180.0;

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Print head resolution in dots per millimeter (~7.087).
pub const PIXELS_PER_MM: f64 = DPI / MM_PER_INCH;

/// Convert a length in millimeters to whole pixels.
///
/// Negative, NaN and infinite lengths map to zero.
///
/// ```
/// use tapelabel::label::tape::mm_to_px;
///
/// assert_eq!(mm_to_px(0.0), 0);
/// assert_eq!(mm_to_px(10.0), 71);
/// assert_eq!(mm_to_px(-3.0), 0);
/// ```
#[inline]
pub fn mm_to_px(mm: f64) -> u32 {
    if !mm.is_finite() || mm <= 0.0 {
        return 0;
    }
    (mm * PIXELS_PER_MM).round() as u32
}

/// Tape width class. Serialized as the width in millimeters (`6`, `9`, `12`, `19`).
///
/// Any other number is snapped to the nearest supported width when decoding,
/// so a malformed request still yields a printable label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "u32")]
pub enum TapeSize {
    Mm6,
    Mm9,
    #[default]
    Mm12,
    Mm19,
}

impl TapeSize {
    /// All supported tapes, narrowest first.
    pub const ALL: [TapeSize; 4] = [TapeSize::Mm6, TapeSize::Mm9, TapeSize::Mm12, TapeSize::Mm19];

    /// Tape width in millimeters.
    pub fn mm(self) -> u32 {
        match self {
            TapeSize::Mm6 => 6,
            TapeSize::Mm9 => 9,
            TapeSize::Mm12 => 12,
            TapeSize::Mm19 => 19,
        }
    }

    /// Printable height in pixels for this tape.
    pub fn height_px(self) -> u32 {
        match self {
            TapeSize::Mm6 => 32,
            TapeSize::Mm9 => 48,
            TapeSize::Mm12 => 64,
            TapeSize::Mm19 => 96,
        }
    }

    /// Snap an arbitrary width to the nearest supported tape (ties go to the narrower tape).
    pub fn nearest(mm: f64) -> Self {
        if !mm.is_finite() {
            return TapeSize::default();
        }
        let mut best = TapeSize::Mm6;
        for tape in Self::ALL {
            if (tape.mm() as f64 - mm).abs() < (best.mm() as f64 - mm).abs() {
                best = tape;
            }
        }
        best
    }
}

impl From<f64> for TapeSize {
    fn from(mm: f64) -> Self {
        TapeSize::nearest(mm)
    }
}

impl From<TapeSize> for u32 {
    fn from(tape: TapeSize) -> Self {
        tape.mm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_per_mm() {
        assert!((PIXELS_PER_MM - 7.0866).abs() < 0.001);
    }

    #[test]
    fn test_mm_to_px_rounds() {
        // 50mm * 7.0866 = 354.33
        assert_eq!(mm_to_px(50.0), 354);
        assert_eq!(mm_to_px(f64::NAN), 0);
        assert_eq!(mm_to_px(f64::INFINITY), 0);
    }

    #[test]
    fn test_tape_heights() {
        let heights: Vec<u32> = TapeSize::ALL.iter().map(|t| t.height_px()).collect();
        assert_eq!(heights, vec![32, 48, 64, 96]);
    }

    #[test]
    fn test_nearest_snaps_unsupported_widths() {
        assert_eq!(TapeSize::nearest(12.0), TapeSize::Mm12);
        assert_eq!(TapeSize::nearest(24.0), TapeSize::Mm19);
        assert_eq!(TapeSize::nearest(0.0), TapeSize::Mm6);
        assert_eq!(TapeSize::nearest(10.0), TapeSize::Mm9);
        assert_eq!(TapeSize::nearest(f64::NAN), TapeSize::Mm12);
    }

    #[test]
    fn test_serde_as_number() {
        let tape: TapeSize = serde_json::from_str("19").unwrap();
        assert_eq!(tape, TapeSize::Mm19);
        assert_eq!(serde_json::to_string(&TapeSize::Mm9).unwrap(), "9");
    }
}
