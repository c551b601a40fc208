//! Rendering contract.
//!
//! Tools draw through [`GraphicsContext`], which a backend implements (see the
//! `capmark-render` crate for the Vello scene builder). Coordinates handed to
//! the context are in image space together with the image→canvas transform.

use crate::color::SerializableColor;
use crate::properties::FontWeight;
use kurbo::{Affine, BezPath, Point, Size};
use peniko::Color;

/// A single run of text to draw.
#[derive(Debug, Clone, Copy)]
pub struct TextRun<'a> {
    pub text: &'a str,
    /// Top-left of the layout box.
    pub origin: Point,
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub color: Color,
}

/// Drawing surface the tools render onto.
pub trait GraphicsContext {
    /// Stroke a path with the given line width (in image units).
    fn stroke(&mut self, path: &BezPath, transform: Affine, color: Color, width: f64);

    /// Fill a path using the non-zero rule.
    fn fill(&mut self, path: &BezPath, transform: Affine, color: Color);

    /// Draw a run of text.
    fn draw_text(&mut self, run: &TextRun<'_>, transform: Affine);
}

/// Text layout measurement used to size text annotations.
pub trait TextMeasurer {
    /// Size of the laid out text, without padding.
    fn measure(&mut self, text: &str, font_size: f64, weight: FontWeight) -> Size;
}

/// Font-free measurer based on average glyph advance.
///
/// Good enough for tests and headless use; real frontends plug in a layout
/// engine (`capmark_render::ParleyMeasurer`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateMeasurer;

impl ApproximateMeasurer {
    const LINE_HEIGHT: f64 = 1.2;

    fn char_width_factor(weight: FontWeight) -> f64 {
        match weight {
            FontWeight::Light => 0.50,
            FontWeight::Regular => 0.55,
            FontWeight::Medium => 0.57,
            FontWeight::Bold => 0.60,
        }
    }
}

impl TextMeasurer for ApproximateMeasurer {
    fn measure(&mut self, text: &str, font_size: f64, weight: FontWeight) -> Size {
        let max_line_len = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        let mut line_count = text.lines().count().max(1);
        if text.ends_with('\n') {
            line_count += 1;
        }
        Size::new(
            max_line_len as f64 * font_size * Self::char_width_factor(weight),
            line_count as f64 * font_size * Self::LINE_HEIGHT,
        )
    }
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Stroke {
        path: BezPath,
        transform: Affine,
        color: SerializableColor,
        width: f64,
    },
    Fill {
        path: BezPath,
        transform: Affine,
        color: SerializableColor,
    },
    Text {
        text: String,
        origin: Point,
        font_size: f64,
        font_weight: FontWeight,
        transform: Affine,
        color: SerializableColor,
    },
}

/// Context that records every call as a display list.
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    pub commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl GraphicsContext for RecordingContext {
    fn stroke(&mut self, path: &BezPath, transform: Affine, color: Color, width: f64) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            transform,
            color: color.into(),
            width,
        });
    }

    fn fill(&mut self, path: &BezPath, transform: Affine, color: Color) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            transform,
            color: color.into(),
        });
    }

    fn draw_text(&mut self, run: &TextRun<'_>, transform: Affine) {
        self.commands.push(DrawCommand::Text {
            text: run.text.to_string(),
            origin: run.origin,
            font_size: run.font_size,
            font_weight: run.font_weight,
            transform,
            color: run.color.into(),
        });
    }
}

/// Adapter that scales every color's alpha, used for in-progress previews.
pub struct FadedContext<'a> {
    inner: &'a mut dyn GraphicsContext,
    factor: f64,
}

impl<'a> FadedContext<'a> {
    /// Alpha multiplier applied to previews.
    pub const PREVIEW_ALPHA: f64 = 0.5;

    pub fn new(inner: &'a mut dyn GraphicsContext, factor: f64) -> Self {
        Self { inner, factor }
    }

    fn fade(&self, color: Color) -> Color {
        SerializableColor::from(color).faded(self.factor).into()
    }
}

impl GraphicsContext for FadedContext<'_> {
    fn stroke(&mut self, path: &BezPath, transform: Affine, color: Color, width: f64) {
        let color = self.fade(color);
        self.inner.stroke(path, transform, color, width);
    }

    fn fill(&mut self, path: &BezPath, transform: Affine, color: Color) {
        let color = self.fade(color);
        self.inner.fill(path, transform, color);
    }

    fn draw_text(&mut self, run: &TextRun<'_>, transform: Affine) {
        let faded = TextRun {
            color: self.fade(run.color),
            ..*run
        };
        self.inner.draw_text(&faded, transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Rect, Shape as _};

    #[test]
    fn test_approximate_measure_single_line() {
        let size = ApproximateMeasurer.measure("Hello", 20.0, FontWeight::Regular);
        assert!((size.width - 5.0 * 20.0 * 0.55).abs() < 1e-9);
        assert!((size.height - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_approximate_measure_multi_line() {
        let size = ApproximateMeasurer.measure("ab\nabcd\n", 10.0, FontWeight::Bold);
        assert!((size.width - 4.0 * 10.0 * 0.60).abs() < 1e-9);
        assert!((size.height - 3.0 * 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = ApproximateMeasurer.measure("Wide", 16.0, FontWeight::Regular);
        let bold = ApproximateMeasurer.measure("Wide", 16.0, FontWeight::Bold);
        assert!(bold.width > regular.width);
    }

    #[test]
    fn test_faded_context_scales_alpha() {
        let mut recorder = RecordingContext::new();
        {
            let mut faded = FadedContext::new(&mut recorder, 0.5);
            let path = Rect::new(0.0, 0.0, 1.0, 1.0).to_path(0.1);
            faded.fill(&path, Affine::IDENTITY, SerializableColor::red().into());
        }
        match &recorder.commands[0] {
            DrawCommand::Fill { color, .. } => assert_eq!(color.a, 128),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
