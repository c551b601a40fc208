//! Arrow tool.

use super::{AnnotationTool, DragState, DragTool, ToolKind, ToolState};
use crate::annotation::Annotation;
use crate::geometry::{ArrowGeometry, point_to_segment_dist};
use crate::properties::{ArrowProperties, ArrowheadStyle};
use crate::render::GraphicsContext;
use kurbo::{Affine, BezPath, Point, Vec2};

/// Drags shorter than this produce no arrow.
const MIN_ARROW_LENGTH: f64 = 5.0;
/// Arrowhead length before scaling with thickness.
const HEAD_BASE_LENGTH: f64 = 12.0;
/// Angle between the shaft and each arrowhead wing.
const HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;
/// Smallest hit band width.
const MIN_HIT_WIDTH: f64 = 8.0;

/// Arrowhead length for a stroke thickness.
pub fn head_length(thickness: f64) -> f64 {
    HEAD_BASE_LENGTH + 2.0 * thickness
}

/// The two wing points of the arrowhead, back-projected from the end point:
/// the θ - 30° wing first, then the θ + 30° wing.
pub fn arrowhead_wings(geometry: &ArrowGeometry, head_length: f64) -> (Point, Point) {
    let theta = geometry.angle();
    let wing = |angle: f64| {
        geometry.end - Vec2::new(angle.cos(), angle.sin()) * head_length
    };
    (wing(theta - HEAD_ANGLE), wing(theta + HEAD_ANGLE))
}

/// Path of the arrowhead and whether it should be filled.
pub fn arrowhead_path(geometry: &ArrowGeometry, style: ArrowheadStyle, head_length: f64) -> (BezPath, bool) {
    let (left, right) = arrowhead_wings(geometry, head_length);
    let tip = geometry.end;
    let dir = Vec2::new(geometry.angle().cos(), geometry.angle().sin());
    let mut path = BezPath::new();

    match style {
        ArrowheadStyle::Standard => {
            path.move_to(left);
            path.line_to(tip);
            path.line_to(right);
            (path, false)
        }
        ArrowheadStyle::Rounded => {
            // Control points are pulled toward the shaft to bow the wings inward
            let axis = tip - dir * (head_length * 0.5);
            let control = |wing: Point| wing.midpoint(tip).midpoint(axis);
            path.move_to(left);
            path.quad_to(control(left), tip);
            path.quad_to(control(right), right);
            (path, false)
        }
        ArrowheadStyle::Square => {
            let back = tip - dir * (head_length * HEAD_ANGLE.cos() * 0.6);
            path.move_to(tip);
            path.line_to(left);
            path.line_to(back);
            path.line_to(right);
            path.close_path();
            (path, true)
        }
    }
}

/// Creates arrows from a drag: start point to release point.
#[derive(Debug, Clone)]
pub struct ArrowTool {
    drag: DragState,
    properties: ArrowProperties,
    head_length: f64,
}

impl Default for ArrowTool {
    fn default() -> Self {
        let properties = ArrowProperties::default();
        Self {
            drag: DragState::default(),
            head_length: head_length(properties.thickness),
            properties,
        }
    }
}

impl ArrowTool {
    /// Arrowhead length derived from the configured thickness.
    pub fn head_length(&self) -> f64 {
        self.head_length
    }

    pub fn properties(&self) -> &ArrowProperties {
        &self.properties
    }
}

impl AnnotationTool for ArrowTool {
    type Properties = ArrowProperties;
    type Geometry = ArrowGeometry;

    const KIND: ToolKind = ToolKind::Arrow;

    fn configure(&mut self, state: &ToolState) {
        self.properties = state.arrow_properties();
        self.head_length = head_length(self.properties.thickness);
    }

    fn render(
        properties: &ArrowProperties,
        geometry: &ArrowGeometry,
        gc: &mut dyn GraphicsContext,
        transform: Affine,
    ) {
        if geometry.start == geometry.end {
            return;
        }
        let color = properties.color.into();

        let mut shaft = BezPath::new();
        shaft.move_to(geometry.start);
        shaft.line_to(geometry.end);
        gc.stroke(&shaft, transform, color, properties.thickness);

        let (head, filled) = arrowhead_path(
            geometry,
            properties.arrowhead_style,
            head_length(properties.thickness),
        );
        if filled {
            gc.fill(&head, transform, color);
        }
        gc.stroke(&head, transform, color, properties.thickness);
    }

    fn hit_test(point: Point, properties: &ArrowProperties, geometry: &ArrowGeometry) -> bool {
        let tolerance = properties.thickness.max(MIN_HIT_WIDTH) / 2.0;
        point_to_segment_dist(point, geometry.start, geometry.end) <= tolerance
    }
}

impl DragTool for ArrowTool {
    fn drag(&self) -> &DragState {
        &self.drag
    }

    fn drag_mut(&mut self) -> &mut DragState {
        &mut self.drag
    }

    fn build(&self, start: Point, end: Point) -> Option<Annotation> {
        let geometry = ArrowGeometry::new(start, end);
        if geometry.length() < MIN_ARROW_LENGTH {
            return None;
        }
        Some(Annotation::arrow(self.properties.clone(), geometry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationShape;
    use crate::render::{DrawCommand, RecordingContext};

    fn drag(tool: &mut ArrowTool, from: Point, to: Point) -> Option<Annotation> {
        tool.draw_start(from);
        tool.draw_update(to);
        tool.draw_end(to)
    }

    #[test]
    fn test_short_drag_discarded() {
        let mut tool = ArrowTool::default();
        assert!(drag(&mut tool, Point::new(0.0, 0.0), Point::new(3.0, 0.0)).is_none());
        assert!(!tool.drag().is_active());
    }

    #[test]
    fn test_drag_creates_arrow() {
        let mut tool = ArrowTool::default();
        let arrow = drag(&mut tool, Point::new(0.0, 0.0), Point::new(10.0, 0.0)).unwrap();
        match arrow.shape() {
            AnnotationShape::Arrow { geometry, .. } => {
                assert_eq!(geometry.start, Point::new(0.0, 0.0));
                assert_eq!(geometry.end, Point::new(10.0, 0.0));
            }
            other => panic!("expected arrow, got {other:?}"),
        }
    }

    #[test]
    fn test_head_length_scales_with_thickness() {
        let mut tool = ArrowTool::default();
        let mut state = ToolState::new();
        state.set_thickness(4.0);
        tool.configure(&state);
        assert!((tool.head_length() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wings_at_thirty_degrees() {
        let geometry = ArrowGeometry::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let (first, second) = arrowhead_wings(&geometry, 20.0);
        let expected_x = 100.0 - 20.0 * HEAD_ANGLE.cos();
        assert!((first.x - expected_x).abs() < 1e-9);
        assert!((second.x - expected_x).abs() < 1e-9);
        // θ - 30° is back-projected below the shaft, θ + 30° above it
        assert!((first.y - 10.0).abs() < 1e-9);
        assert!((second.y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_uses_min_band() {
        let props = ArrowProperties {
            thickness: 2.0,
            ..ArrowProperties::default()
        };
        let geometry = ArrowGeometry::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(ArrowTool::hit_test(Point::new(50.0, 4.0), &props, &geometry));
        assert!(!ArrowTool::hit_test(Point::new(50.0, 4.5), &props, &geometry));

        let thick = ArrowProperties {
            thickness: 20.0,
            ..props
        };
        assert!(ArrowTool::hit_test(Point::new(50.0, 9.5), &thick, &geometry));
    }

    #[test]
    fn test_square_head_is_filled() {
        let props = ArrowProperties {
            arrowhead_style: ArrowheadStyle::Square,
            ..ArrowProperties::default()
        };
        let geometry = ArrowGeometry::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let mut gc = RecordingContext::new();
        ArrowTool::render(&props, &geometry, &mut gc, Affine::IDENTITY);
        assert_eq!(gc.len(), 3);
        assert!(matches!(gc.commands[1], DrawCommand::Fill { .. }));
    }

    #[test]
    fn test_open_heads_are_stroked_only() {
        for style in [ArrowheadStyle::Standard, ArrowheadStyle::Rounded] {
            let props = ArrowProperties {
                arrowhead_style: style,
                ..ArrowProperties::default()
            };
            let geometry = ArrowGeometry::new(Point::new(0.0, 0.0), Point::new(0.0, 80.0));
            let mut gc = RecordingContext::new();
            ArrowTool::render(&props, &geometry, &mut gc, Affine::IDENTITY);
            assert_eq!(gc.len(), 2);
            assert!(gc.commands.iter().all(|c| matches!(c, DrawCommand::Stroke { .. })));
        }
    }
}
