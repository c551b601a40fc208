//! Text layout with Parley.

use crate::renderer::{RenderResult, RendererError};
use capmark_core::properties::FontWeight;
use capmark_core::render::{ApproximateMeasurer, TextMeasurer};
use kurbo::Size;
use parley::{FontContext, Layout, LayoutContext, StyleProperty};
use peniko::Brush;

/// Lay out `text` as a single unconstrained block.
pub(crate) fn layout_text(
    font_cx: &mut FontContext,
    layout_cx: &mut LayoutContext<Brush>,
    text: &str,
    font_size: f64,
    weight: FontWeight,
    brush: Brush,
) -> Layout<Brush> {
    let mut builder = layout_cx.ranged_builder(font_cx, text, 1.0, false);
    builder.push_default(StyleProperty::FontSize(font_size as f32));
    builder.push_default(StyleProperty::Brush(brush));
    builder.push_default(StyleProperty::FontWeight(parley::FontWeight::new(weight.value())));
    builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(
        "system-ui, sans-serif".into(),
    )));
    let mut layout = builder.build(text);
    layout.break_all_lines(None);
    layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());
    layout
}

/// Measures text with the system fonts Parley finds.
///
/// When no font can lay the text out (e.g. a headless machine without fonts)
/// the glyph-advance estimate is used instead.
pub struct ParleyMeasurer {
    font_cx: FontContext,
    layout_cx: LayoutContext<Brush>,
}

impl Default for ParleyMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyMeasurer {
    pub fn new() -> Self {
        Self {
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
        }
    }

    /// Layout size of `text`, or an error when it cannot be laid out.
    pub fn try_measure(&mut self, text: &str, font_size: f64, weight: FontWeight) -> RenderResult<Size> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(RendererError::TextLayout(format!("bad font size {font_size}")));
        }
        let layout = layout_text(
            &mut self.font_cx,
            &mut self.layout_cx,
            text,
            font_size,
            weight,
            Brush::Solid(peniko::Color::BLACK),
        );
        let size = Size::new(layout.width() as f64, layout.height() as f64);
        if size.width <= 0.0 && !text.trim().is_empty() {
            return Err(RendererError::TextLayout("no font available".to_string()));
        }
        Ok(size)
    }
}

impl TextMeasurer for ParleyMeasurer {
    fn measure(&mut self, text: &str, font_size: f64, weight: FontWeight) -> Size {
        match self.try_measure(text, font_size, weight) {
            Ok(size) => size,
            Err(e) => {
                log::warn!("{e}; estimating text size instead");
                ApproximateMeasurer.measure(text, font_size, weight)
            }
        }
    }
}
