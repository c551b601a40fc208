//! Rectangle tool.

use super::{AnnotationTool, DragState, DragTool, ToolKind, ToolState};
use crate::annotation::Annotation;
use crate::geometry::{RectGeometry, rect_contains};
use crate::properties::RectangleProperties;
use crate::render::GraphicsContext;
use kurbo::{Affine, Point, Shape};

/// A drag must exceed this in at least one dimension.
const MIN_SIZE: f64 = 5.0;
const MIN_HIT_WIDTH: f64 = 8.0;

/// Creates outlined (optionally filled) rectangles from a drag.
#[derive(Debug, Clone, Default)]
pub struct RectangleTool {
    drag: DragState,
    properties: RectangleProperties,
}

impl RectangleTool {
    pub fn properties(&self) -> &RectangleProperties {
        &self.properties
    }
}

impl AnnotationTool for RectangleTool {
    type Properties = RectangleProperties;
    type Geometry = RectGeometry;

    const KIND: ToolKind = ToolKind::Rectangle;

    fn configure(&mut self, state: &ToolState) {
        self.properties = state.rectangle_properties();
    }

    fn render(
        properties: &RectangleProperties,
        geometry: &RectGeometry,
        gc: &mut dyn GraphicsContext,
        transform: Affine,
    ) {
        let path = geometry.bounds().to_path(0.1);
        if let Some(fill) = properties.fill_color {
            gc.fill(&path, transform, fill.with_opacity(properties.fill_opacity).into());
        }
        gc.stroke(&path, transform, properties.color.into(), properties.thickness);
    }

    fn hit_test(point: Point, properties: &RectangleProperties, geometry: &RectGeometry) -> bool {
        let band = properties.thickness.max(MIN_HIT_WIDTH) / 2.0;
        let bounds = geometry.bounds();
        if !rect_contains(bounds.inflate(band, band), point) {
            return false;
        }
        if properties.fill_color.is_some() {
            return true;
        }
        // Unfilled rectangles only select on the outline band
        let inner = bounds.inflate(-band, -band);
        inner.width() <= 0.0 || inner.height() <= 0.0 || !inner.contains(point)
    }
}

impl DragTool for RectangleTool {
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
        Some(Annotation::rectangle(self.properties.clone(), geometry))
    }
}
