//! Tool system for annotating a capture.
//!
//! One tool per [`AnnotationKind`]. Drag-driven tools share [`DragTool`]'s
//! start/update/end handling; the text tool runs its own editing session.
//! [`Tool`] is the closed set the engine dispatches over.

mod arrow;
mod blur;
mod highlight;
mod rectangle;
mod text;

pub use arrow::ArrowTool;
pub use blur::BlurTool;
pub use highlight::HighlightTool;
pub use rectangle::RectangleTool;
pub use text::{TEXT_PADDING, TextSession, TextSnapshot, TextTool};

use crate::annotation::{Annotation, AnnotationKind, AnnotationShape};
use crate::color::SerializableColor;
use crate::properties::{
    ArrowProperties, ArrowheadStyle, BlurProperties, FontWeight, HighlightProperties,
    RectangleProperties, TextProperties,
};
use crate::render::{GraphicsContext, TextMeasurer};
use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};

/// Tools map one-to-one onto annotation kinds.
pub type ToolKind = AnnotationKind;

/// Live settings of an annotation session.
///
/// Tools read these on every draw event, so a change is visible to the next
/// event without any buffering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolState {
    /// Currently selected tool.
    pub tool: ToolKind,
    pub color: SerializableColor,
    pub thickness: f64,
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub text_background: Option<SerializableColor>,
    pub arrowhead_style: ArrowheadStyle,
    pub fill_color: Option<SerializableColor>,
    pub fill_opacity: f64,
    pub highlight_opacity: f64,
    pub blur_radius: f64,
    /// Swatches offered to the user.
    pub palette: Vec<SerializableColor>,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            color: SerializableColor::red(),
            thickness: 3.0,
            font_size: TextProperties::DEFAULT_FONT_SIZE,
            font_weight: FontWeight::default(),
            text_background: None,
            arrowhead_style: ArrowheadStyle::default(),
            fill_color: None,
            fill_opacity: RectangleProperties::default().fill_opacity,
            highlight_opacity: HighlightProperties::DEFAULT_OPACITY,
            blur_radius: BlurProperties::DEFAULT_RADIUS,
            palette: SerializableColor::default_palette(),
        }
    }
}

impl ToolState {
    pub const MIN_THICKNESS: f64 = 1.0;
    pub const MAX_THICKNESS: f64 = 50.0;
    pub const MIN_FONT_SIZE: f64 = 6.0;
    pub const MAX_FONT_SIZE: f64 = 200.0;
    pub const MAX_BLUR_RADIUS: f64 = 100.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Select a tool and apply its type-specific defaults.
    pub fn select_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
        match tool {
            ToolKind::Highlight => {
                self.highlight_opacity = HighlightProperties::DEFAULT_OPACITY;
                self.color = SerializableColor::yellow();
            }
            ToolKind::Blur => {
                self.blur_radius = BlurProperties::DEFAULT_RADIUS;
            }
            ToolKind::Arrow | ToolKind::Text | ToolKind::Rectangle => {}
        }
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.color = color;
    }

    pub fn set_thickness(&mut self, thickness: f64) {
        self.thickness = thickness.clamp(Self::MIN_THICKNESS, Self::MAX_THICKNESS);
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = size.clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);
    }

    pub fn set_font_weight(&mut self, weight: FontWeight) {
        self.font_weight = weight;
    }

    pub fn set_text_background(&mut self, color: Option<SerializableColor>) {
        self.text_background = color;
    }

    pub fn set_arrowhead_style(&mut self, style: ArrowheadStyle) {
        self.arrowhead_style = style;
    }

    pub fn set_fill_color(&mut self, color: Option<SerializableColor>) {
        self.fill_color = color;
    }

    pub fn set_fill_opacity(&mut self, opacity: f64) {
        self.fill_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_highlight_opacity(&mut self, opacity: f64) {
        self.highlight_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_blur_radius(&mut self, radius: f64) {
        self.blur_radius = radius.clamp(0.0, Self::MAX_BLUR_RADIUS);
    }

    pub fn arrow_properties(&self) -> ArrowProperties {
        ArrowProperties {
            color: self.color,
            thickness: self.thickness,
            arrowhead_style: self.arrowhead_style,
        }
    }

    pub fn text_properties(&self, text: String) -> TextProperties {
        TextProperties {
            color: self.color,
            thickness: self.thickness,
            font_size: self.font_size,
            text,
            background_color: self.text_background,
            font_weight: self.font_weight,
        }
    }

    pub fn rectangle_properties(&self) -> RectangleProperties {
        RectangleProperties {
            color: self.color,
            thickness: self.thickness,
            fill_color: self.fill_color,
            fill_opacity: self.fill_opacity,
        }
    }

    pub fn highlight_properties(&self) -> HighlightProperties {
        HighlightProperties {
            color: self.color,
            thickness: self.thickness,
            opacity: self.highlight_opacity,
        }
    }

    pub fn blur_properties(&self) -> BlurProperties {
        BlurProperties {
            color: self.color,
            thickness: self.thickness,
            blur_radius: self.blur_radius,
        }
    }
}

/// Transient state of a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// Waiting for a drag to start.
    #[default]
    Idle,
    /// A drag is in progress.
    Active {
        /// Starting point of the drag.
        start: Point,
        /// Latest tracked point.
        current: Point,
    },
}

impl DragState {
    pub fn begin(&mut self, point: Point) {
        *self = DragState::Active {
            start: point,
            current: point,
        };
    }

    /// Track a new point. Ignored unless a drag is active.
    pub fn update(&mut self, point: Point) {
        if let DragState::Active { current, .. } = self {
            *current = point;
        }
    }

    /// Complete the drag at `point`, returning `(start, end)`.
    pub fn finish(&mut self, point: Point) -> Option<(Point, Point)> {
        match std::mem::take(self) {
            DragState::Active { start, .. } => Some((start, point)),
            DragState::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self, DragState::Active { .. })
    }

    /// `(start, current)` of the active drag.
    pub fn span(&self) -> Option<(Point, Point)> {
        match self {
            DragState::Active { start, current } => Some((*start, *current)),
            DragState::Idle => None,
        }
    }
}

/// Behavior every tool provides for its own annotation type.
///
/// Rendering and hit testing only look at the annotation's own properties and
/// geometry, so historical annotations draw the same whatever the live
/// [`ToolState`] is.
pub trait AnnotationTool {
    type Properties;
    type Geometry;

    /// Kind of annotation this tool produces.
    const KIND: ToolKind;

    /// Derive internal parameters from the live tool state.
    fn configure(&mut self, state: &ToolState);

    /// Draw an annotation of this type.
    fn render(
        properties: &Self::Properties,
        geometry: &Self::Geometry,
        gc: &mut dyn GraphicsContext,
        transform: Affine,
    );

    /// Whether `point` (image space) selects the annotation.
    fn hit_test(point: Point, properties: &Self::Properties, geometry: &Self::Geometry) -> bool;
}

/// Tools that create their annotation from a single drag.
pub trait DragTool: AnnotationTool {
    fn drag(&self) -> &DragState;

    fn drag_mut(&mut self) -> &mut DragState;

    /// Build the annotation for a drag, or `None` when the drag is below the
    /// tool's minimum size.
    fn build(&self, start: Point, end: Point) -> Option<Annotation>;

    fn draw_start(&mut self, point: Point) {
        self.drag_mut().begin(point);
    }

    fn draw_update(&mut self, point: Point) {
        self.drag_mut().update(point);
    }

    fn draw_end(&mut self, point: Point) -> Option<Annotation> {
        let (start, end) = self.drag_mut().finish(point)?;
        let annotation = self.build(start, end);
        if annotation.is_none() {
            log::debug!(
                "Discarded {} drag below threshold: {:?} -> {:?}",
                Self::KIND.as_str(),
                start,
                end
            );
        }
        annotation
    }

    /// Shape the current drag would produce if it ended now.
    fn preview(&self) -> Option<Annotation> {
        let (start, current) = self.drag().span()?;
        self.build(start, current)
    }
}

/// The active tool of an annotation session.
#[derive(Debug, Clone)]
pub enum Tool {
    Arrow(ArrowTool),
    Text(TextTool),
    Rectangle(RectangleTool),
    Highlight(HighlightTool),
    Blur(BlurTool),
}

impl Tool {
    /// Create the tool for `kind`, configured from `state`.
    pub fn new(kind: ToolKind, state: &ToolState) -> Self {
        let mut tool = match kind {
            ToolKind::Arrow => Tool::Arrow(ArrowTool::default()),
            ToolKind::Text => Tool::Text(TextTool::default()),
            ToolKind::Rectangle => Tool::Rectangle(RectangleTool::default()),
            ToolKind::Highlight => Tool::Highlight(HighlightTool::default()),
            ToolKind::Blur => Tool::Blur(BlurTool::default()),
        };
        tool.configure(state);
        tool
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::Arrow(_) => ArrowTool::KIND,
            Tool::Text(_) => TextTool::KIND,
            Tool::Rectangle(_) => RectangleTool::KIND,
            Tool::Highlight(_) => HighlightTool::KIND,
            Tool::Blur(_) => BlurTool::KIND,
        }
    }

    pub fn configure(&mut self, state: &ToolState) {
        match self {
            Tool::Arrow(t) => t.configure(state),
            Tool::Text(t) => t.configure(state),
            Tool::Rectangle(t) => t.configure(state),
            Tool::Highlight(t) => t.configure(state),
            Tool::Blur(t) => t.configure(state),
        }
    }

    pub fn draw_start(&mut self, point: Point, state: &ToolState) {
        self.configure(state);
        match self {
            Tool::Arrow(t) => t.draw_start(point),
            Tool::Text(t) => {
                t.begin(point);
            }
            Tool::Rectangle(t) => t.draw_start(point),
            Tool::Highlight(t) => t.draw_start(point),
            Tool::Blur(t) => t.draw_start(point),
        }
    }

    pub fn draw_update(&mut self, point: Point, state: &ToolState) {
        self.configure(state);
        match self {
            Tool::Arrow(t) => t.draw_update(point),
            Tool::Text(t) => t.update(point),
            Tool::Rectangle(t) => t.draw_update(point),
            Tool::Highlight(t) => t.draw_update(point),
            Tool::Blur(t) => t.draw_update(point),
        }
    }

    /// Finish a drag. Text never produces an annotation here; it waits for an
    /// explicit commit.
    pub fn draw_end(&mut self, point: Point, state: &ToolState) -> Option<Annotation> {
        self.configure(state);
        match self {
            Tool::Arrow(t) => t.draw_end(point),
            Tool::Text(t) => t.end(point),
            Tool::Rectangle(t) => t.draw_end(point),
            Tool::Highlight(t) => t.draw_end(point),
            Tool::Blur(t) => t.draw_end(point),
        }
    }

    /// In-progress shape, never part of the committed list.
    pub fn preview(&self, measurer: &mut dyn TextMeasurer) -> Option<Annotation> {
        match self {
            Tool::Arrow(t) => t.preview(),
            Tool::Text(t) => t.preview(measurer),
            Tool::Rectangle(t) => t.preview(),
            Tool::Highlight(t) => t.preview(),
            Tool::Blur(t) => t.preview(),
        }
    }

    /// Drop any transient drawing state without producing an annotation.
    pub fn cancel(&mut self) {
        match self {
            Tool::Arrow(t) => t.drag_mut().cancel(),
            Tool::Text(t) => t.cancel(),
            Tool::Rectangle(t) => t.drag_mut().cancel(),
            Tool::Highlight(t) => t.drag_mut().cancel(),
            Tool::Blur(t) => t.drag_mut().cancel(),
        }
    }

    /// Whether a drag or a text edit is in progress.
    pub fn is_active(&self) -> bool {
        match self {
            Tool::Arrow(t) => t.drag().is_active(),
            Tool::Text(t) => t.is_editing(),
            Tool::Rectangle(t) => t.drag().is_active(),
            Tool::Highlight(t) => t.drag().is_active(),
            Tool::Blur(t) => t.drag().is_active(),
        }
    }

    pub fn as_text(&self) -> Option<&TextTool> {
        match self {
            Tool::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextTool> {
        match self {
            Tool::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Draw any annotation with the tool for its type.
pub fn render_annotation(annotation: &Annotation, gc: &mut dyn GraphicsContext, transform: Affine) {
    match annotation.shape() {
        AnnotationShape::Arrow { properties, geometry } => {
            ArrowTool::render(properties, geometry, gc, transform)
        }
        AnnotationShape::Text { properties, geometry } => {
            TextTool::render(properties, geometry, gc, transform)
        }
        AnnotationShape::Rectangle { properties, geometry } => {
            RectangleTool::render(properties, geometry, gc, transform)
        }
        AnnotationShape::Highlight { properties, geometry } => {
            HighlightTool::render(properties, geometry, gc, transform)
        }
        AnnotationShape::Blur { properties, geometry } => {
            BlurTool::render(properties, geometry, gc, transform)
        }
    }
}

/// Hit test any annotation with the tool for its type (image space).
pub fn hit_test_annotation(point: Point, annotation: &Annotation) -> bool {
    match annotation.shape() {
        AnnotationShape::Arrow { properties, geometry } => {
            ArrowTool::hit_test(point, properties, geometry)
        }
        AnnotationShape::Text { properties, geometry } => {
            TextTool::hit_test(point, properties, geometry)
        }
        AnnotationShape::Rectangle { properties, geometry } => {
            RectangleTool::hit_test(point, properties, geometry)
        }
        AnnotationShape::Highlight { properties, geometry } => {
            HighlightTool::hit_test(point, properties, geometry)
        }
        AnnotationShape::Blur { properties, geometry } => {
            BlurTool::hit_test(point, properties, geometry)
        }
    }
}
