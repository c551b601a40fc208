//! Renderer trait abstraction.

use capmark_core::render::RecordingContext;
use capmark_core::AnnotationEngine;
use kurbo::Size;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid canvas size: {0}")]
    InvalidSize(String),
    #[error("Text layout failed: {0}")]
    TextLayout(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// A backend that can draw an annotation session.
pub trait Renderer {
    /// Draw the engine's committed annotations and preview for a canvas of
    /// `canvas_size`, replacing whatever was drawn before.
    fn render_engine(&mut self, engine: &mut AnnotationEngine, canvas_size: Size) -> RenderResult<()>;
}

/// Reject sizes no frame can be drawn at.
pub fn check_canvas_size(size: Size) -> RenderResult<()> {
    if !size.width.is_finite() || !size.height.is_finite() {
        return Err(RendererError::InvalidSize(format!("{size:?} is not finite")));
    }
    if size.width <= 0.0 || size.height <= 0.0 {
        return Err(RendererError::InvalidSize(format!("{size:?} has no area")));
    }
    Ok(())
}

/// Display-list backend, for headless use and tests.
impl Renderer for RecordingContext {
    fn render_engine(&mut self, engine: &mut AnnotationEngine, canvas_size: Size) -> RenderResult<()> {
        check_canvas_size(canvas_size)?;
        self.clear();
        engine.render(self, canvas_size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_canvas_size_check() {
        assert!(check_canvas_size(Size::new(800.0, 600.0)).is_ok());
        assert!(matches!(
            check_canvas_size(Size::ZERO),
            Err(RendererError::InvalidSize(_))
        ));
        assert!(check_canvas_size(Size::new(f64::NAN, 10.0)).is_err());
    }

    #[test]
    fn test_recording_renderer_redraws_from_scratch() {
        let mut engine = AnnotationEngine::new(Size::new(400.0, 300.0));
        engine.draw_start(Point::new(10.0, 10.0));
        engine.draw_end(Point::new(200.0, 10.0));

        let mut recorder = RecordingContext::new();
        recorder.render_engine(&mut engine, Size::new(400.0, 300.0)).unwrap();
        let first = recorder.len();
        assert!(first > 0);
        recorder.render_engine(&mut engine, Size::new(400.0, 300.0)).unwrap();
        assert_eq!(recorder.len(), first);
    }
}
