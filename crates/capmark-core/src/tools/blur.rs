//! Blur tool.
//!
//! The region is obscured visually with a tinted fill and a mosaic grid; no
//! pixels are sampled or filtered.

use super::{AnnotationTool, DragState, DragTool, ToolKind, ToolState};
use crate::annotation::Annotation;
use crate::geometry::{RectGeometry, rect_contains};
use crate::properties::BlurProperties;
use crate::render::GraphicsContext;
use kurbo::{Affine, BezPath, Point, Shape};

const MIN_SIZE: f64 = 10.0;
const HIT_MARGIN: f64 = 2.0;
const MIN_CELL: f64 = 4.0;
const GRID_WIDTH: f64 = 1.0;
/// Most mosaic lines drawn along either axis.
const MAX_GRID_LINES: f64 = 256.0;

/// Fill opacity for a blur radius: stronger blur hides more.
pub fn blur_fill_opacity(radius: f64) -> f64 {
    (0.35 + radius / 100.0 * 0.5).clamp(0.35, 0.85)
}

/// Side length of one mosaic cell.
pub fn blur_cell_size(radius: f64) -> f64 {
    radius.max(MIN_CELL) * 2.0
}

#[derive(Debug, Clone, Default)]
pub struct BlurTool {
    drag: DragState,
    properties: BlurProperties,
}

impl AnnotationTool for BlurTool {
    type Properties = BlurProperties;
    type Geometry = RectGeometry;

    const KIND: ToolKind = ToolKind::Blur;

    fn configure(&mut self, state: &ToolState) {
        self.properties = state.blur_properties();
    }

    fn render(
        properties: &BlurProperties,
        geometry: &RectGeometry,
        gc: &mut dyn GraphicsContext,
        transform: Affine,
    ) {
        let bounds = geometry.bounds();
        let fill = properties
            .color
            .with_opacity(blur_fill_opacity(properties.blur_radius));
        gc.fill(&bounds.to_path(0.1), transform, fill.into());

        let longest = bounds.width().max(bounds.height());
        let cell = blur_cell_size(properties.blur_radius).max(longest / MAX_GRID_LINES);
        let mut grid = BezPath::new();
        let mut x = bounds.x0 + cell;
        while x < bounds.x1 {
            grid.move_to(Point::new(x, bounds.y0));
            grid.line_to(Point::new(x, bounds.y1));
            x += cell;
        }
        let mut y = bounds.y0 + cell;
        while y < bounds.y1 {
            grid.move_to(Point::new(bounds.x0, y));
            grid.line_to(Point::new(bounds.x1, y));
            y += cell;
        }
        if !grid.elements().is_empty() {
            let line = properties.color.with_opacity(0.2);
            gc.stroke(&grid, transform, line.into(), GRID_WIDTH);
        }
    }

    fn hit_test(point: Point, _properties: &BlurProperties, geometry: &RectGeometry) -> bool {
        rect_contains(geometry.bounds().inflate(HIT_MARGIN, HIT_MARGIN), point)
    }
}

impl DragTool for BlurTool {
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
        Some(Annotation::blur(self.properties.clone(), geometry))
    }
}
