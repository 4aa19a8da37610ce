//! # Layout Engine
//!
//! Pure geometry: given the widgets, the label settings and the size of the
//! bitmap each widget rendered to, compute the canvas size and where every
//! bitmap goes. Nothing here paints; see [`crate::render::compose`].
//!
//! ## Algorithm
//!
//! ```text
//! content = Σ bitmap widths + 4px × (n − 1)
//! width   = max(content + 2 × margin, minLength)
//! x0      = margin                          (left)
//!           (width − content) / 2           (center)
//!           width − margin − content        (right)
//! y_i     = (height − h_i) / 2
//! ```
//!
//! Widgets that rendered nothing take no space and no padding.
//!
//! ## Example
//!
//! ```
//! use tapelabel::label::{LabelSettings, TextWidget, Widget};
//! use tapelabel::layout::{layout, Size};
//!
//! let widgets = vec![
//!     Widget::Text(TextWidget::new("a")),
//!     Widget::Text(TextWidget::new("b")),
//! ];
//! let settings = LabelSettings { margin_px: 10.0, ..Default::default() };
//! let sizes = [Some(Size::new(20, 64)), Some(Size::new(30, 32))];
//!
//! let result = layout(&widgets, &settings, &sizes);
//! assert_eq!(result.content_width, 54);
//! assert_eq!(result.width, 74);
//! assert_eq!(result.placements[1].x, 10 + 20 + 4);
//! assert_eq!(result.placements[1].y, 16);
//! ```

use serde::Serialize;

use crate::label::{Alignment, LabelSettings, Widget};

/// Horizontal gap between adjacent widgets, in pixels.
pub const WIDGET_PADDING_PX: u32 = 4;

/// Pixel dimensions of a rendered widget bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Where one widget's bitmap is painted on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Index into the widget list the layout was computed from.
    pub index: usize,
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Full label geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub content_x: u32,
    pub content_width: u32,
    pub placements: Vec<Placement>,
    /// Margin guide x-positions, when margins are shown.
    pub guides: Option<(u32, u32)>,
}

/// Compute the layout.
///
/// `sizes[i]` is the rendered size of `widgets[i]`, or `None` when that widget
/// produced no content. Missing trailing entries count as `None`.
pub fn layout(widgets: &[Widget], settings: &LabelSettings, sizes: &[Option<Size>]) -> LayoutResult {
    let height = settings.height_px();
    let margin = settings.margin();

    let present: Vec<(usize, Size)> = widgets
        .iter()
        .enumerate()
        .filter_map(|(i, _)| sizes.get(i).copied().flatten().map(|s| (i, s)))
        .collect();

    let bitmap_width: u32 = present
        .iter()
        .fold(0u32, |acc, (_, s)| acc.saturating_add(s.width));
    let gaps = (present.len().saturating_sub(1) as u32).saturating_mul(WIDGET_PADDING_PX);
    let content_width = bitmap_width.saturating_add(gaps);

    let width = content_width
        .saturating_add(margin.saturating_mul(2))
        .max(settings.min_length_px());

    let content_x = match settings.justify {
        Alignment::Left => margin,
        Alignment::Center => width.saturating_sub(content_width) / 2,
        Alignment::Right => width.saturating_sub(margin).saturating_sub(content_width),
    };

    let mut placements = Vec::with_capacity(present.len());
    let mut x = content_x;
    for (index, size) in present {
        placements.push(Placement {
            index,
            id: widgets[index].id().to_string(),
            x,
            y: height.saturating_sub(size.height) / 2,
            width: size.width,
            height: size.height,
        });
        x = x.saturating_add(size.width).saturating_add(WIDGET_PADDING_PX);
    }

    let guides = (settings.show_margins && margin > 0).then(|| (margin, width.saturating_sub(margin)));

    LayoutResult {
        width,
        height,
        margin,
        content_x,
        content_width,
        placements,
        guides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{QrWidget, TapeSize, TextWidget};
    use pretty_assertions::assert_eq;

    fn texts(n: usize) -> Vec<Widget> {
        (0..n)
            .map(|i| {
                let mut w = TextWidget::new("x");
                w.id = format!("w{i}");
                Widget::Text(w)
            })
            .collect()
    }

    fn settings(margin: f64, justify: Alignment) -> LabelSettings {
        LabelSettings {
            margin_px: margin,
            justify,
            ..Default::default()
        }
    }

    #[test]
    fn test_content_width_includes_padding_between_widgets() {
        let widgets = texts(3);
        let sizes = [
            Some(Size::new(10, 64)),
            Some(Size::new(20, 64)),
            Some(Size::new(30, 64)),
        ];
        let result = layout(&widgets, &settings(0.0, Alignment::Left), &sizes);
        assert_eq!(result.content_width, 60 + 2 * WIDGET_PADDING_PX);
        assert_eq!(result.width, 68);
        let xs: Vec<u32> = result.placements.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 14, 38]);
    }

    #[test]
    fn test_empty_widgets_take_no_space() {
        let widgets = texts(3);
        let sizes = [Some(Size::new(10, 64)), None, Some(Size::new(10, 64))];
        let result = layout(&widgets, &settings(5.0, Alignment::Left), &sizes);
        assert_eq!(result.content_width, 24);
        assert_eq!(result.placements.len(), 2);
        assert_eq!(result.placements[1].index, 2);
        assert_eq!(result.placements[1].id, "w2");
        assert_eq!(result.placements[1].x, 5 + 10 + 4);
    }

    #[test]
    fn test_no_widgets_sized_by_margins_and_min_length() {
        let result = layout(&[], &settings(56.0, Alignment::Center), &[]);
        assert_eq!(result.content_width, 0);
        assert_eq!(result.width, 112);
        assert!(result.placements.is_empty());

        let s = LabelSettings {
            margin_px: 10.0,
            min_length_mm: 50.0,
            ..Default::default()
        };
        assert_eq!(layout(&[], &s, &[]).width, 354);
    }

    #[test]
    fn test_min_length_extends_but_never_truncates() {
        let widgets = texts(1);
        let sizes = [Some(Size::new(400, 64))];
        let s = LabelSettings {
            margin_px: 10.0,
            min_length_mm: 10.0,
            ..Default::default()
        };
        let result = layout(&widgets, &s, &sizes);
        assert_eq!(result.width, 420);
        assert!(result.width >= result.content_width + 2 * result.margin);
    }

    #[test]
    fn test_justification_offsets() {
        let widgets = texts(1);
        let sizes = [Some(Size::new(50, 64))];
        let base = LabelSettings {
            margin_px: 10.0,
            min_length_mm: 50.0,
            ..Default::default()
        };

        let left = layout(&widgets, &LabelSettings { justify: Alignment::Left, ..base.clone() }, &sizes);
        assert_eq!(left.content_x, 10);

        let center = layout(&widgets, &LabelSettings { justify: Alignment::Center, ..base.clone() }, &sizes);
        assert_eq!(center.content_x, (354 - 50) / 2);

        let right = layout(&widgets, &LabelSettings { justify: Alignment::Right, ..base }, &sizes);
        assert_eq!(right.content_x, 354 - 10 - 50);
        let last = right.placements.last().unwrap();
        assert_eq!(last.x + last.width, right.width - right.margin);
    }

    #[test]
    fn test_center_offset_floors() {
        let widgets = texts(1);
        let sizes = [Some(Size::new(3, 64))];
        let s = LabelSettings {
            margin_px: 0.0,
            min_length_mm: 1.0, // 7px
            justify: Alignment::Center,
            ..Default::default()
        };
        let result = layout(&widgets, &s, &sizes);
        assert_eq!(result.width, 7);
        assert_eq!(result.content_x, 2);
    }

    #[test]
    fn test_vertical_centering_and_overflow() {
        let widgets = vec![
            Widget::Qr(QrWidget::new("a")),
            Widget::Qr(QrWidget::new("b")),
        ];
        let s = LabelSettings {
            tape_size_mm: TapeSize::Mm6,
            ..Default::default()
        };
        let sizes = [Some(Size::new(20, 21)), Some(Size::new(20, 80))];
        let result = layout(&widgets, &s, &sizes);
        assert_eq!(result.height, 32);
        assert_eq!(result.placements[0].y, 5);
        assert_eq!(result.placements[1].y, 0);
    }

    #[test]
    fn test_guides_only_when_shown_and_margin_positive() {
        let widgets = texts(1);
        let sizes = [Some(Size::new(50, 64))];
        let mut s = settings(10.0, Alignment::Left);
        assert_eq!(layout(&widgets, &s, &sizes).guides, None);

        s.show_margins = true;
        let result = layout(&widgets, &s, &sizes);
        assert_eq!(result.guides, Some((10, 60)));
        assert_eq!(result.width, 70);

        s.margin_px = 0.0;
        assert_eq!(layout(&widgets, &s, &sizes).guides, None);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let widgets = texts(4);
        let sizes = [
            Some(Size::new(13, 40)),
            None,
            Some(Size::new(7, 64)),
            Some(Size::new(99, 3)),
        ];
        let s = settings(33.0, Alignment::Right);
        assert_eq!(layout(&widgets, &s, &sizes), layout(&widgets, &s, &sizes));
    }
}
