//! Widget types: the visual elements placed left to right on a label.
//!
//! Widgets are tagged by `"type"` on the wire:
//!
//! ```json
//! [
//!     {"id": "a", "type": "text", "text": "Hello\nWorld", "fontStyle": "bold"},
//!     {"id": "b", "type": "qr", "content": "https://example.com"},
//!     {"id": "c", "type": "barcode", "content": "12345", "barcodeType": "code39"},
//!     {"id": "d", "type": "image", "filename": "3f2a.png"}
//! ]
//! ```

use serde::{Deserialize, Serialize};

use super::settings::Alignment;

/// Smallest accepted font scale percentage.
pub const MIN_FONT_SCALE: i32 = 10;
/// Largest accepted font scale percentage.
pub const MAX_FONT_SCALE: i32 = 150;
/// Font scale used when none is given.
pub const DEFAULT_FONT_SCALE: i32 = 90;
/// Thickest accepted text frame, in pixels.
pub const MAX_FRAME_WIDTH_PX: i32 = 20;

/// A single label element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Widget {
    Text(TextWidget),
    Qr(QrWidget),
    Barcode(BarcodeWidget),
    Image(ImageWidget),
}

impl Widget {
    /// Stable opaque id (unique within a label, irrelevant for rendering).
    pub fn id(&self) -> &str {
        match self {
            Widget::Text(w) => &w.id,
            Widget::Qr(w) => &w.id,
            Widget::Barcode(w) => &w.id,
            Widget::Image(w) => &w.id,
        }
    }

    /// Short tag name, matching the wire `"type"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Widget::Text(_) => "text",
            Widget::Qr(_) => "qr",
            Widget::Barcode(_) => "barcode",
            Widget::Image(_) => "image",
        }
    }

    /// The text-bearing field of this widget, if it has one.
    pub fn text_field(&self) -> Option<&str> {
        match self {
            Widget::Text(w) => Some(&w.text),
            Widget::Qr(w) => Some(&w.content),
            Widget::Barcode(w) => Some(&w.content),
            Widget::Image(_) => None,
        }
    }

    /// Mutable access to the text-bearing field of this widget, if it has one.
    pub fn text_field_mut(&mut self) -> Option<&mut String> {
        match self {
            Widget::Text(w) => Some(&mut w.text),
            Widget::Qr(w) => Some(&mut w.content),
            Widget::Barcode(w) => Some(&mut w.content),
            Widget::Image(_) => None,
        }
    }
}

/// Font style for text widgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    Narrow,
}

/// Multi-line text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextWidget {
    pub id: String,
    pub text: String,
    pub font_style: FontStyle,
    pub font_scale: i32,
    pub frame_width_px: i32,
    pub align: Alignment,
}

impl Default for TextWidget {
    fn default() -> Self {
        Self {
            id: String::new(),
            text: String::new(),
            font_style: FontStyle::Regular,
            font_scale: DEFAULT_FONT_SCALE,
            frame_width_px: 0,
            align: Alignment::Left,
        }
    }
}

impl TextWidget {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    /// Font scale percentage clamped to `10..=150`.
    pub fn scale_percent(&self) -> u32 {
        self.font_scale.clamp(MIN_FONT_SCALE, MAX_FONT_SCALE) as u32
    }

    /// Frame width in pixels clamped to `0..=20`.
    pub fn frame_width(&self) -> u32 {
        self.frame_width_px.clamp(0, MAX_FRAME_WIDTH_PX) as u32
    }
}

/// QR code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QrWidget {
    pub id: String,
    pub content: String,
}

impl QrWidget {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            ..Default::default()
        }
    }
}

/// One-dimensional barcode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarcodeWidget {
    pub id: String,
    pub content: String,
    pub barcode_type: BarcodeType,
    /// Render human-readable text under the symbol.
    pub show_text: bool,
}

impl BarcodeWidget {
    pub fn new(barcode_type: BarcodeType, content: &str) -> Self {
        Self {
            content: content.to_string(),
            barcode_type,
            ..Default::default()
        }
    }
}

/// Reference to a previously uploaded image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageWidget {
    pub id: String,
    pub filename: String,
}

impl ImageWidget {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            ..Default::default()
        }
    }
}

/// Barcode symbologies.
///
/// Decoding is lenient: tags are matched case-insensitively and anything
/// unknown falls back to [`BarcodeType::Code128`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BarcodeType {
    #[default]
    Code128,
    Code39,
    Codabar,
    Ean,
    Ean13,
    Ean14,
    Ean8,
    Gs1,
    Gs1128,
    Isbn,
    Isbn10,
    Isbn13,
    Itf,
    Upc,
    Upca,
}

impl BarcodeType {
    /// All symbologies, in display order.
    pub const ALL: [BarcodeType; 15] = [
        BarcodeType::Code128,
        BarcodeType::Code39,
        BarcodeType::Codabar,
        BarcodeType::Ean13,
        BarcodeType::Ean8,
        BarcodeType::Upc,
        BarcodeType::Upca,
        BarcodeType::Itf,
        BarcodeType::Isbn,
        BarcodeType::Isbn10,
        BarcodeType::Isbn13,
        BarcodeType::Ean,
        BarcodeType::Ean14,
        BarcodeType::Gs1,
        BarcodeType::Gs1128,
    ];

    /// Wire tag (e.g. `"gs1_128"`).
    pub fn as_str(self) -> &'static str {
        match self {
            BarcodeType::Code128 => "code128",
            BarcodeType::Code39 => "code39",
            BarcodeType::Codabar => "codabar",
            BarcodeType::Ean => "ean",
            BarcodeType::Ean13 => "ean13",
            BarcodeType::Ean14 => "ean14",
            BarcodeType::Ean8 => "ean8",
            BarcodeType::Gs1 => "gs1",
            BarcodeType::Gs1128 => "gs1_128",
            BarcodeType::Isbn => "isbn",
            BarcodeType::Isbn10 => "isbn10",
            BarcodeType::Isbn13 => "isbn13",
            BarcodeType::Itf => "itf",
            BarcodeType::Upc => "upc",
            BarcodeType::Upca => "upca",
        }
    }

    /// Parse a wire tag, returning `None` for unknown symbologies.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }
}

impl From<String> for BarcodeType {
    fn from(s: String) -> Self {
        BarcodeType::parse(&s).unwrap_or_default()
    }
}

impl From<BarcodeType> for String {
    fn from(t: BarcodeType) -> Self {
        t.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_widget_list_from_json() {
        let json = r#"[
            {"id": "a", "type": "text", "text": "Hi", "fontStyle": "bold", "fontScale": 120,
             "frameWidthPx": 2, "align": "center"},
            {"id": "b", "type": "qr", "content": "https://example.com"},
            {"id": "c", "type": "barcode", "content": "12345", "barcodeType": "code39", "showText": true},
            {"id": "d", "type": "image", "filename": "img.png"}
        ]"#;
        let widgets: Vec<Widget> = serde_json::from_str(json).unwrap();
        assert_eq!(widgets.len(), 4);
        assert_eq!(
            widgets[0],
            Widget::Text(TextWidget {
                id: "a".into(),
                text: "Hi".into(),
                font_style: FontStyle::Bold,
                font_scale: 120,
                frame_width_px: 2,
                align: Alignment::Center,
            })
        );
        assert_eq!(widgets[1].kind(), "qr");
        assert!(matches!(
            &widgets[2],
            Widget::Barcode(BarcodeWidget { barcode_type: BarcodeType::Code39, show_text: true, .. })
        ));
        assert_eq!(widgets[3].text_field(), None);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let widget: Widget = serde_json::from_str(r#"{"type": "text", "text": "x"}"#).unwrap();
        let Widget::Text(text) = widget else {
            panic!("expected text widget");
        };
        assert_eq!(text.font_scale, DEFAULT_FONT_SCALE);
        assert_eq!(text.font_style, FontStyle::Regular);
        assert_eq!(text.id, "");
    }

    #[test]
    fn test_unknown_widget_type_rejected() {
        let result: Result<Widget, _> = serde_json::from_str(r#"{"type": "hologram"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_text_bounds_are_clamped() {
        let mut text = TextWidget::new("x");
        text.font_scale = 500;
        text.frame_width_px = -4;
        assert_eq!(text.scale_percent(), 150);
        assert_eq!(text.frame_width(), 0);
        text.font_scale = 1;
        assert_eq!(text.scale_percent(), 10);
        text.frame_width_px = 2_147_483_000;
        assert_eq!(text.frame_width(), 20);
        text.frame_width_px = i32::MIN;
        assert_eq!(text.frame_width(), 0);
    }

    #[test]
    fn test_barcode_type_lenient_parsing() {
        assert_eq!(BarcodeType::parse("GS1-128"), Some(BarcodeType::Gs1128));
        assert_eq!(BarcodeType::parse("EAN13"), Some(BarcodeType::Ean13));
        assert_eq!(BarcodeType::parse("pdf417"), None);

        let widget: BarcodeWidget =
            serde_json::from_str(r#"{"content": "1", "barcodeType": "bogus"}"#).unwrap();
        assert_eq!(widget.barcode_type, BarcodeType::Code128);
    }

    #[test]
    fn test_barcode_type_round_trips_every_tag() {
        for t in BarcodeType::ALL {
            assert_eq!(BarcodeType::parse(t.as_str()), Some(t));
        }
        assert_eq!(
            serde_json::to_string(&BarcodeType::Gs1128).unwrap(),
            "\"gs1_128\""
        );
    }
}
