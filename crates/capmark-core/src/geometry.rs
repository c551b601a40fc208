//! Positional descriptions of annotations.
//!
//! Every geometry reduces to an axis-aligned bounding box in image space.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Line from a start point to the point the arrowhead sits on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowGeometry {
    pub start: Point,
    pub end: Point,
}

impl ArrowGeometry {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Envelope of the two endpoints.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }

    /// Shaft angle in radians, measured from start to end.
    pub fn angle(&self) -> f64 {
        let d = self.end - self.start;
        d.y.atan2(d.x)
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.start + delta, self.end + delta)
    }
}

/// Text placement: top-left origin plus the measured layout size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextGeometry {
    pub origin: Point,
    pub size: Size,
}

impl TextGeometry {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.origin + delta, self.size)
    }
}

/// Axis-aligned rectangle used by rectangle, highlight and blur annotations.
///
/// Width and height are never negative; `origin` is the min corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectGeometry {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl RectGeometry {
    /// Create a rectangle directly. Negative extents are folded back so the
    /// origin stays the min corner.
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self::from_points(origin, Point::new(origin.x + width, origin.y + height))
    }

    /// Create a rectangle from two drag points in any order.
    pub fn from_points(p1: Point, p2: Point) -> Self {
        Self {
            origin: Point::new(p1.x.min(p2.x), p1.y.min(p2.y)),
            width: (p2.x - p1.x).abs(),
            height: (p2.y - p1.y).abs(),
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::from_points(Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1))
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            origin: self.origin + delta,
            ..*self
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Inclusive containment; kurbo's `Rect::contains` excludes the max edges.
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Inclusive overlap test that also accepts zero-area rectangles (a
/// horizontal arrow has a zero-height envelope).
pub fn rects_touch(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
