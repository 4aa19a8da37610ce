//! # Widget Model
//!
//! The immutable data shapes consumed by the layout engine, the renderers and
//! the batch controller.
//!
//! ## Example
//!
//! ```
//! use tapelabel::label::Label;
//!
//! let json = r#"{
//!     "widgets": [
//!         {"id": "1", "type": "text", "text": "Hello :name:"},
//!         {"id": "2", "type": "qr", "content": "https://example.com/:name:"}
//!     ],
//!     "settings": {"tapeSizeMm": 12, "justify": "center"}
//! }"#;
//!
//! let label: Label = serde_json::from_str(json).unwrap();
//! assert_eq!(label.widgets.len(), 2);
//! assert_eq!(label.settings.height_px(), 64);
//! ```

pub mod batch;
pub mod settings;
pub mod tape;
pub mod widget;

pub use batch::{BatchRow, BatchState};
pub use settings::{Alignment, LabelColor, LabelSettings};
pub use tape::TapeSize;
pub use widget::{
    BarcodeType, BarcodeWidget, FontStyle, ImageWidget, QrWidget, TextWidget, Widget,
};

use serde::{Deserialize, Serialize};

/// A label template: ordered widgets plus page settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub widgets: Vec<Widget>,
    pub settings: LabelSettings,
}
