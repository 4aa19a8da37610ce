//! # Render Dispatch
//!
//! Turns each widget into a bitmap through a capability provider, then hands
//! the bitmap sizes to the [layout engine](crate::layout) and composes the
//! final label image.
//!
//! ## Providers
//!
//! | Widget  | Trait              | Default              |
//! |---------|--------------------|----------------------|
//! | text    | [`TextRenderer`]    | [`text::SpleenText`]  |
//! | qr      | [`QrRenderer`]      | [`qr::QrCodeRenderer`] |
//! | barcode | [`BarcodeRenderer`] | [`barcode::LinearBarcode`] |
//! | image   | [`ImageRenderer`]   | [`picture::DitheredImage`] |
//!
//! Every provider answers `Ok(Some(bitmap))`, `Ok(None)` when there is nothing
//! to draw, or `Err` when it failed. Dispatch logs failures and treats them as
//! "no content", so a single broken widget never takes the whole label down.

pub mod barcode;
pub mod compose;
pub mod dither;
pub mod picture;
pub mod qr;
pub mod text;

use std::sync::Arc;

use thiserror::Error;

use crate::error::LabelError;
use crate::label::{
    BarcodeWidget, ImageWidget, LabelColor, LabelSettings, QrWidget, TextWidget, Widget,
};
use crate::layout::{self, Size};
use crate::uploads::ImageStore;

pub use compose::{ComposeMode, RenderedLabel, compose};

/// A rendered widget or label. Pixels are already in label colors.
pub type Bitmap = image::RgbImage;

/// Widest bitmap a single widget may produce.
pub const MAX_WIDGET_WIDTH_PX: u32 = 16_384;

/// Widest label, summed over every rendered widget.
pub const MAX_LABEL_WIDTH_PX: u32 = 65_536;

/// Failure inside a capability provider.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Font error: {0}")]
    Font(String),

    #[error("QR error: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("Barcode error: {0}")]
    Barcode(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content too wide: {0}px exceeds {MAX_WIDGET_WIDTH_PX}px")]
    TooWide(u64),
}

/// Accept a bitmap width computed from widget input, or refuse it before
/// anything is allocated.
pub(crate) fn check_width(width: u64) -> Result<u32, RenderError> {
    if width > MAX_WIDGET_WIDTH_PX as u64 {
        return Err(RenderError::TooWide(width));
    }
    Ok(width as u32)
}

/// Renders text widgets.
pub trait TextRenderer: Send + Sync {
    fn render_text(
        &self,
        widget: &TextWidget,
        height: u32,
        fg: LabelColor,
        bg: LabelColor,
    ) -> Result<Option<Bitmap>, RenderError>;
}

/// Renders QR widgets.
pub trait QrRenderer: Send + Sync {
    fn render_qr(
        &self,
        widget: &QrWidget,
        height: u32,
        fg: LabelColor,
        bg: LabelColor,
    ) -> Result<Option<Bitmap>, RenderError>;
}

/// Renders barcode widgets.
pub trait BarcodeRenderer: Send + Sync {
    fn render_barcode(
        &self,
        widget: &BarcodeWidget,
        height: u32,
        fg: LabelColor,
        bg: LabelColor,
    ) -> Result<Option<Bitmap>, RenderError>;
}

/// Renders image widgets.
pub trait ImageRenderer: Send + Sync {
    fn render_image(
        &self,
        widget: &ImageWidget,
        height: u32,
        fg: LabelColor,
        bg: LabelColor,
    ) -> Result<Option<Bitmap>, RenderError>;
}

/// The set of providers used to render a label.
///
/// Cheap to clone; providers are shared.
#[derive(Clone)]
pub struct WidgetRenderers {
    text: Arc<dyn TextRenderer>,
    qr: Arc<dyn QrRenderer>,
    barcode: Arc<dyn BarcodeRenderer>,
    image: Arc<dyn ImageRenderer>,
}

impl WidgetRenderers {
    /// Default providers, with images resolved through `store`.
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self {
            text: Arc::new(text::SpleenText),
            qr: Arc::new(qr::QrCodeRenderer),
            barcode: Arc::new(barcode::LinearBarcode),
            image: Arc::new(picture::DitheredImage::new(store)),
        }
    }

    pub fn with_text(mut self, renderer: Arc<dyn TextRenderer>) -> Self {
        self.text = renderer;
        self
    }

    pub fn with_qr(mut self, renderer: Arc<dyn QrRenderer>) -> Self {
        self.qr = renderer;
        self
    }

    pub fn with_barcode(mut self, renderer: Arc<dyn BarcodeRenderer>) -> Self {
        self.barcode = renderer;
        self
    }

    pub fn with_image(mut self, renderer: Arc<dyn ImageRenderer>) -> Self {
        self.image = renderer;
        self
    }

    /// Render one widget at the tape height. Provider errors are logged and
    /// reported as no content.
    pub fn render_widget(&self, widget: &Widget, settings: &LabelSettings) -> Option<Bitmap> {
        let height = settings.height_px();
        let fg = settings.foreground_color;
        let bg = settings.background_color;

        let result = match widget {
            Widget::Text(w) => self.text.render_text(w, height, fg, bg),
            Widget::Qr(w) => self.qr.render_qr(w, height, fg, bg),
            Widget::Barcode(w) => self.barcode.render_barcode(w, height, fg, bg),
            Widget::Image(w) => self.image.render_image(w, height, fg, bg),
        };

        match result {
            Ok(bitmap) => bitmap.filter(|b| b.width() > 0 && b.height() > 0),
            Err(e) => {
                tracing::warn!(
                    widget = widget.id(),
                    kind = widget.kind(),
                    error = %e,
                    "widget render failed, omitting"
                );
                None
            }
        }
    }

    /// Render every widget, keeping positions aligned with `widgets`.
    pub fn render_all(&self, widgets: &[Widget], settings: &LabelSettings) -> Vec<Option<Bitmap>> {
        widgets
            .iter()
            .map(|w| self.render_widget(w, settings))
            .collect()
    }

    /// Render, lay out and compose a whole label.
    ///
    /// Fails when no widget produces content, or when the rendered widgets
    /// together exceed [`MAX_LABEL_WIDTH_PX`].
    pub fn render_label(
        &self,
        widgets: &[Widget],
        settings: &LabelSettings,
        mode: ComposeMode,
    ) -> Result<RenderedLabel, LabelError> {
        let mut bitmaps = Vec::with_capacity(widgets.len());
        let mut content_width: u64 = 0;
        for widget in widgets {
            let bitmap = self.render_widget(widget, settings);
            if let Some(b) = &bitmap {
                content_width += b.width() as u64;
                if content_width > MAX_LABEL_WIDTH_PX as u64 {
                    return Err(LabelError::Validation(format!(
                        "Label too long: content exceeds {MAX_LABEL_WIDTH_PX}px"
                    )));
                }
            }
            bitmaps.push(bitmap);
        }

        let sizes: Vec<Option<Size>> = bitmaps
            .iter()
            .map(|b| b.as_ref().map(|b| Size::new(b.width(), b.height())))
            .collect();
        let layout = layout::layout(widgets, settings, &sizes);
        if layout.placements.is_empty() {
            return Err(LabelError::Validation("No renderable widgets provided".to_string()));
        }
        let image = compose(&layout, &bitmaps, settings, mode);

        Ok(RenderedLabel {
            widgets: widgets.to_vec(),
            layout,
            image,
        })
    }
}

/// Allocate a bitmap filled with `color`.
pub fn blank(width: u32, height: u32, color: LabelColor) -> Bitmap {
    Bitmap::from_pixel(width, height, image::Rgb(color.rgb()))
}
