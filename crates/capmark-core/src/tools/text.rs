//! Text tool and its editing session.
//!
//! Pressing with the text tool opens a session at the pointer. Keystrokes go
//! into the session's buffer; nothing reaches the annotation list until the
//! session is committed with [`TextTool::finish`].

use super::{AnnotationTool, ToolKind, ToolState};
use crate::annotation::Annotation;
use crate::color::SerializableColor;
use crate::geometry::{TextGeometry, rect_contains};
use crate::properties::{FontWeight, TextProperties};
use crate::render::{GraphicsContext, TextMeasurer, TextRun};
use kurbo::{Affine, Point, Shape, Size, Vec2};

/// Added to the measured text size to get the annotation's bounds.
pub const TEXT_PADDING: Size = Size::new(4.0, 2.0);

/// Offset of the glyphs inside the padded box.
const TEXT_INSET: Vec2 = Vec2::new(2.0, 1.0);
const HIT_MARGIN: f64 = 4.0;

/// Style captured when a session starts.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSnapshot {
    pub color: SerializableColor,
    pub thickness: f64,
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub background_color: Option<SerializableColor>,
}

impl Default for TextSnapshot {
    fn default() -> Self {
        Self::from_properties(&TextProperties::default())
    }
}

impl TextSnapshot {
    pub fn from_state(state: &ToolState) -> Self {
        Self {
            color: state.color,
            thickness: state.thickness,
            font_size: state.font_size,
            font_weight: state.font_weight,
            background_color: state.text_background,
        }
    }

    fn from_properties(properties: &TextProperties) -> Self {
        Self {
            color: properties.color,
            thickness: properties.thickness,
            font_size: properties.font_size,
            font_weight: properties.font_weight,
            background_color: properties.background_color,
        }
    }

    pub fn properties(&self, text: String) -> TextProperties {
        TextProperties {
            color: self.color,
            thickness: self.thickness,
            font_size: self.font_size,
            text,
            background_color: self.background_color,
            font_weight: self.font_weight,
        }
    }
}

/// Editing state of the text tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TextSession {
    #[default]
    Idle,
    Editing {
        position: Point,
        buffer: String,
        snapshot: TextSnapshot,
    },
}

#[derive(Debug, Clone, Default)]
pub struct TextTool {
    session: TextSession,
    /// Style for the next session.
    template: TextSnapshot,
}

impl TextTool {
    pub fn session(&self) -> &TextSession {
        &self.session
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.session, TextSession::Editing { .. })
    }

    /// Open a session at `point`. Returns `false` (and changes nothing) if a
    /// session is already open.
    pub fn begin(&mut self, point: Point) -> bool {
        if self.is_editing() {
            log::debug!("Ignoring text start at {point:?}: a session is already open");
            return false;
        }
        self.session = TextSession::Editing {
            position: point,
            buffer: String::new(),
            snapshot: self.template.clone(),
        };
        true
    }

    /// Pointer motion has no meaning for text.
    pub fn update(&mut self, _point: Point) {}

    /// Releasing the pointer never yields text; see [`TextTool::finish`].
    pub fn end(&mut self, _point: Point) -> Option<Annotation> {
        None
    }

    pub fn text(&self) -> Option<&str> {
        match &self.session {
            TextSession::Editing { buffer, .. } => Some(buffer),
            TextSession::Idle => None,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match &self.session {
            TextSession::Editing { position, .. } => Some(*position),
            TextSession::Idle => None,
        }
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        match &mut self.session {
            TextSession::Editing { buffer, .. } => Some(buffer),
            TextSession::Idle => None,
        }
    }

    pub fn insert_text(&mut self, text: &str) -> bool {
        match self.buffer_mut() {
            Some(buffer) => {
                buffer.push_str(text);
                true
            }
            None => false,
        }
    }

    pub fn set_text(&mut self, text: &str) -> bool {
        match self.buffer_mut() {
            Some(buffer) => {
                buffer.clear();
                buffer.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Remove the last character. Returns `false` if nothing was removed.
    pub fn backspace(&mut self) -> bool {
        self.buffer_mut().and_then(|buffer| buffer.pop()).is_some()
    }

    /// Close the session and build the annotation from the trimmed buffer.
    /// Whitespace-only text closes the session without an annotation.
    pub fn finish(&mut self, measurer: &mut dyn TextMeasurer) -> Option<Annotation> {
        let annotation = self.build(measurer);
        self.session = TextSession::Idle;
        annotation
    }

    /// Drop the session without producing anything.
    pub fn cancel(&mut self) {
        self.session = TextSession::Idle;
    }

    /// What a commit would produce right now.
    pub fn preview(&self, measurer: &mut dyn TextMeasurer) -> Option<Annotation> {
        self.build(measurer)
    }

    fn build(&self, measurer: &mut dyn TextMeasurer) -> Option<Annotation> {
        let TextSession::Editing {
            position,
            buffer,
            snapshot,
        } = &self.session
        else {
            return None;
        };
        let text = buffer.trim();
        if text.is_empty() {
            return None;
        }
        let measured = measurer.measure(text, snapshot.font_size, snapshot.font_weight);
        let size = Size::new(
            measured.width + TEXT_PADDING.width,
            measured.height + TEXT_PADDING.height,
        );
        Some(Annotation::text(
            snapshot.properties(text.to_string()),
            TextGeometry::new(*position, size),
        ))
    }
}

impl AnnotationTool for TextTool {
    type Properties = TextProperties;
    type Geometry = TextGeometry;

    const KIND: ToolKind = ToolKind::Text;

    fn configure(&mut self, state: &ToolState) {
        self.template = TextSnapshot::from_state(state);
        if let TextSession::Editing { snapshot, .. } = &mut self.session {
            *snapshot = self.template.clone();
        }
    }

    fn render(
        properties: &TextProperties,
        geometry: &TextGeometry,
        gc: &mut dyn GraphicsContext,
        transform: Affine,
    ) {
        if let Some(background) = properties.background_color {
            gc.fill(&geometry.bounds().to_path(0.1), transform, background.into());
        }
        gc.draw_text(
            &TextRun {
                text: &properties.text,
                origin: geometry.origin + TEXT_INSET,
                font_size: properties.font_size,
                font_weight: properties.font_weight,
                color: properties.color.into(),
            },
            transform,
        );
    }

    fn hit_test(point: Point, _properties: &TextProperties, geometry: &TextGeometry) -> bool {
        rect_contains(geometry.bounds().inflate(HIT_MARGIN, HIT_MARGIN), point)
    }
}
