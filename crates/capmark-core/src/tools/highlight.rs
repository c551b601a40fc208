//! Highlighter tool: a translucent filled box.

use super::{AnnotationTool, DragState, DragTool, ToolKind, ToolState};
use crate::annotation::Annotation;
use crate::geometry::{RectGeometry, rect_contains};
use crate::properties::HighlightProperties;
use crate::render::GraphicsContext;
use kurbo::{Affine, Point, Shape};

const MIN_SIZE: f64 = 5.0;
const HIT_MARGIN: f64 = 2.0;

#[derive(Debug, Clone, Default)]
pub struct HighlightTool {
    drag: DragState,
    properties: HighlightProperties,
}

impl AnnotationTool for HighlightTool {
    type Properties = HighlightProperties;
    type Geometry = RectGeometry;

    const KIND: ToolKind = ToolKind::Highlight;

    fn configure(&mut self, state: &ToolState) {
        self.properties = state.highlight_properties();
    }

    fn render(
        properties: &HighlightProperties,
        geometry: &RectGeometry,
        gc: &mut dyn GraphicsContext,
        transform: Affine,
    ) {
        let path = geometry.bounds().to_path(0.1);
        let color = properties.color.with_opacity(properties.opacity);
        gc.fill(&path, transform, color.into());
    }

    fn hit_test(point: Point, _properties: &HighlightProperties, geometry: &RectGeometry) -> bool {
        rect_contains(geometry.bounds().inflate(HIT_MARGIN, HIT_MARGIN), point)
    }
}

impl DragTool for HighlightTool {
    fn drag(&self) -> &DragState {
        &self.drag
    }

    fn drag_mut(&mut self) -> &mut DragState {
        &mut self.drag
    }

    fn build(&self, start: Point, end: Point) -> Option<Annotation> {
        let geometry = RectGeometry::from_points(start, end);
        if geometry.width <= MIN_SIZE && geometry.height <= MIN_SIZE {
            return None;
        }
        Some(Annotation::highlight(self.properties.clone(), geometry))
    }
}
