//! Vello scene backend.

use crate::measure::layout_text;
use crate::renderer::{RenderResult, Renderer, check_canvas_size};
use capmark_core::AnnotationEngine;
use capmark_core::render::{GraphicsContext, TextRun};
use kurbo::{Affine, BezPath, Rect, Size, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext};
use peniko::{Brush, Color, Fill};
use vello::Scene;

/// Builds a Vello scene from annotation draw calls.
pub struct VelloContext {
    scene: Scene,
    /// Kept across frames so fonts are only discovered once.
    font_cx: FontContext,
    layout_cx: LayoutContext<Brush>,
    /// Painted under the annotations when set (e.g. letterbox around the image).
    background: Option<Color>,
}

impl Default for VelloContext {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloContext {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            background: None,
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    pub fn reset(&mut self) {
        self.scene.reset();
    }
}

impl GraphicsContext for VelloContext {
    fn stroke(&mut self, path: &BezPath, transform: Affine, color: Color, width: f64) {
        let stroke = Stroke::new(width);
        self.scene.stroke(&stroke, transform, color, None, path);
    }

    fn fill(&mut self, path: &BezPath, transform: Affine, color: Color) {
        self.scene.fill(Fill::NonZero, transform, color, None, path);
    }

    fn draw_text(&mut self, run: &TextRun<'_>, transform: Affine) {
        if run.text.is_empty() {
            return;
        }
        let brush = Brush::Solid(run.color);
        let layout = layout_text(
            &mut self.font_cx,
            &mut self.layout_cx,
            run.text,
            run.font_size,
            run.font_weight,
            brush.clone(),
        );
        let text_transform = transform * Affine::translate(run.origin.to_vec2());

        let mut glyph_count = 0;
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let font_size = run.font_size();
                let glyph_xform = run
                    .synthesis()
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();
                glyph_count += glyphs.len();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }

        if glyph_count == 0 {
            log::debug!("No font available for text run {:?}", run.text);
        }
    }
}

impl Renderer for VelloContext {
    fn render_engine(&mut self, engine: &mut AnnotationEngine, canvas_size: Size) -> RenderResult<()> {
        check_canvas_size(canvas_size)?;
        self.scene.reset();
        if let Some(background) = self.background {
            let rect = Rect::from_origin_size((0.0, 0.0), canvas_size);
            self.scene.fill(Fill::NonZero, Affine::IDENTITY, background, None, &rect);
        }
        engine.render(self, canvas_size);
        Ok(())
    }
}
