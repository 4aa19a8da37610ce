//! Label page settings: tape, margins, justification and colors.

use serde::{Deserialize, Serialize};

use super::tape::{TapeSize, mm_to_px};

/// Default visible margin on each side, in pixels.
pub const DEFAULT_MARGIN_PX: f64 = 56.0;

/// Upper bound for `marginPx` and `minLengthMm`.
pub const MAX_LENGTH_SETTING: f64 = 500.0;

/// Horizontal alignment, used both for widget text and label justification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Closed tape/ink palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelColor {
    White,
    Black,
    Yellow,
    Blue,
    Red,
    Green,
}

impl LabelColor {
    /// RGB value used when painting bitmaps.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            LabelColor::White => [0xff, 0xff, 0xff],
            LabelColor::Black => [0x00, 0x00, 0x00],
            LabelColor::Yellow => [0xff, 0xdd, 0x00],
            LabelColor::Blue => [0x00, 0x55, 0xff],
            LabelColor::Red => [0xdd, 0x00, 0x00],
            LabelColor::Green => [0x00, 0xaa, 0x00],
        }
    }
}

/// Page-level settings for one label.
///
/// Numeric fields are accepted as sent by the caller and clamped on read
/// through the accessor methods; the raw fields are never trusted by the
/// layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSettings {
    pub tape_size_mm: TapeSize,
    pub margin_px: f64,
    pub min_length_mm: f64,
    pub justify: Alignment,
    pub foreground_color: LabelColor,
    pub background_color: LabelColor,
    pub show_margins: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer_id: Option<String>,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            tape_size_mm: TapeSize::default(),
            margin_px: DEFAULT_MARGIN_PX,
            min_length_mm: 0.0,
            justify: Alignment::Center,
            foreground_color: LabelColor::Black,
            background_color: LabelColor::White,
            show_margins: false,
            printer_id: None,
        }
    }
}

fn clamp_length(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, MAX_LENGTH_SETTING)
    } else {
        0.0
    }
}

impl LabelSettings {
    /// Canvas height in pixels for the configured tape.
    pub fn height_px(&self) -> u32 {
        self.tape_size_mm.height_px()
    }

    /// Margin in whole pixels, clamped to `0..=500`.
    pub fn margin(&self) -> u32 {
        clamp_length(self.margin_px).round() as u32
    }

    /// Minimum total label length in pixels, clamped to `0..=500mm`.
    pub fn min_length_px(&self) -> u32 {
        mm_to_px(clamp_length(self.min_length_mm))
    }

    /// Requested printer id; an empty string means "auto-select".
    pub fn printer_id(&self) -> Option<&str> {
        self.printer_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let settings: LabelSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, LabelSettings::default());
        assert_eq!(settings.margin(), 56);
        assert_eq!(settings.height_px(), 64);
    }

    #[test]
    fn test_camel_case_fields() {
        let json = r#"{
            "tapeSizeMm": 19,
            "marginPx": 10,
            "minLengthMm": 50,
            "justify": "right",
            "foregroundColor": "red",
            "backgroundColor": "yellow",
            "showMargins": true,
            "printerId": "virtual:Office"
        }"#;
        let settings: LabelSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.height_px(), 96);
        assert_eq!(settings.margin(), 10);
        assert_eq!(settings.min_length_px(), 354);
        assert_eq!(settings.justify, Alignment::Right);
        assert_eq!(settings.foreground_color.rgb(), [0xdd, 0, 0]);
        assert!(settings.show_margins);
        assert_eq!(settings.printer_id(), Some("virtual:Office"));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let settings = LabelSettings {
            margin_px: -20.0,
            min_length_mm: 9000.0,
            ..Default::default()
        };
        assert_eq!(settings.margin(), 0);
        assert_eq!(settings.min_length_px(), mm_to_px(500.0));

        let settings = LabelSettings {
            margin_px: 1e12,
            ..Default::default()
        };
        assert_eq!(settings.margin(), 500);

        let settings = LabelSettings {
            margin_px: f64::NAN,
            min_length_mm: f64::NEG_INFINITY,
            ..Default::default()
        };
        assert_eq!(settings.margin(), 0);
        assert_eq!(settings.min_length_px(), 0);
    }

    #[test]
    fn test_blank_printer_id_means_auto() {
        let settings = LabelSettings {
            printer_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.printer_id(), None);
    }
}
