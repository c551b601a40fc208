//! Mapping between the on-screen canvas and the source image.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Fits an image inside a canvas: uniform scale, no cropping, centered.
///
/// Annotations live in image space. Pointer input arrives in canvas space and
/// is mapped back with [`CoordinateTransform::to_image`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateTransform {
    canvas_size: Size,
    image_size: Size,
    scale: f64,
    offset: Vec2,
}

impl CoordinateTransform {
    pub fn new(canvas_size: Size, image_size: Size) -> Self {
        let scale = Self::fit_scale(canvas_size, image_size);
        let offset = Vec2::new(
            (canvas_size.width - image_size.width * scale) / 2.0,
            (canvas_size.height - image_size.height * scale) / 2.0,
        );
        Self {
            canvas_size,
            image_size,
            scale,
            offset,
        }
    }

    /// Falls back to 1.0 when either size is degenerate.
    fn fit_scale(canvas: Size, image: Size) -> f64 {
        let degenerate = |s: Size| s.width <= 0.0 || s.height <= 0.0;
        if degenerate(canvas) || degenerate(image) {
            return 1.0;
        }
        (canvas.width / image.width).min(canvas.height / image.height)
    }

    /// Recompute for a resized canvas.
    pub fn set_canvas_size(&mut self, canvas_size: Size) {
        *self = Self::new(canvas_size, self.image_size);
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn image_size(&self) -> Size {
        self.image_size
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Image → canvas as an affine, for handing to a renderer.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Image point to canvas point.
    pub fn to_canvas(&self, image_point: Point) -> Point {
        Point::new(
            image_point.x * self.scale + self.offset.x,
            image_point.y * self.scale + self.offset.y,
        )
    }

    /// Canvas point to image point.
    pub fn to_image(&self, canvas_point: Point) -> Point {
        Point::new(
            (canvas_point.x - self.offset.x) / self.scale,
            (canvas_point.y - self.offset.y) / self.scale,
        )
    }

    pub fn rect_to_canvas(&self, rect: Rect) -> Rect {
        Rect::from_origin_size(
            self.to_canvas(rect.origin()),
            Size::new(rect.width() * self.scale, rect.height() * self.scale),
        )
    }

    pub fn rect_to_image(&self, rect: Rect) -> Rect {
        Rect::from_origin_size(
            self.to_image(rect.origin()),
            Size::new(rect.width() / self.scale, rect.height() / self.scale),
        )
    }

    /// Whether a canvas point lands on the image.
    pub fn contains_canvas_point(&self, canvas_point: Point) -> bool {
        self.contains_image_point(self.to_image(canvas_point))
    }

    pub fn contains_image_point(&self, image_point: Point) -> bool {
        image_point.x >= 0.0
            && image_point.y >= 0.0
            && image_point.x <= self.image_size.width
            && image_point.y <= self.image_size.height
    }

    /// Nearest image-space point on the image to a canvas point.
    pub fn to_image_clamped(&self, canvas_point: Point) -> Point {
        let point = self.to_image(canvas_point);
        Point::new(
            point.x.clamp(0.0, self.image_size.width.max(0.0)),
            point.y.clamp(0.0, self.image_size.height.max(0.0)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn test_fit_and_center() {
        // Wide canvas: height limits the scale, image is centered horizontally
        let t = CoordinateTransform::new(Size::new(1000.0, 400.0), Size::new(1000.0, 800.0));
        assert!((t.scale() - 0.5).abs() < EPS);
        assert!((t.offset().x - 250.0).abs() < EPS);
        assert!(t.offset().y.abs() < EPS);
        assert!(approx(t.to_canvas(Point::new(0.0, 0.0)), Point::new(250.0, 0.0)));
    }

    #[test]
    fn test_clamped_mapping_stays_on_image() {
        let t = CoordinateTransform::new(Size::new(1000.0, 400.0), Size::new(1000.0, 800.0));
        assert!(!t.contains_canvas_point(Point::new(10.0, 10.0)));
        assert!(approx(t.to_image_clamped(Point::new(10.0, 10.0)), Point::new(0.0, 20.0)));
        assert!(approx(t.to_image_clamped(Point::new(900.0, 500.0)), Point::new(1000.0, 800.0)));
        assert!(approx(t.to_image_clamped(Point::new(500.0, 200.0)), Point::new(500.0, 400.0)));
    }

    #[test]
    fn test_round_trip() {
        let sizes = [
            (Size::new(800.0, 600.0), Size::new(1920.0, 1080.0)),
            (Size::new(333.0, 777.0), Size::new(100.0, 100.0)),
            (Size::new(1.0, 1.0), Size::new(4096.0, 2160.0)),
        ];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(12.5, 99.25),
            Point::new(-40.0, 3000.0),
        ];
        for (canvas, image) in sizes {
            let t = CoordinateTransform::new(canvas, image);
            for p in points {
                let back = t.to_image(t.to_canvas(p));
                assert!((back.x - p.x).abs() < 1e-6 && (back.y - p.y).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_affine_matches_forward() {
        let t = CoordinateTransform::new(Size::new(640.0, 480.0), Size::new(1000.0, 800.0));
        let p = Point::new(123.0, 456.0);
        assert!(approx(t.affine() * p, t.to_canvas(p)));
    }

    #[test]
    fn test_zero_canvas_guard() {
        let t = CoordinateTransform::new(Size::ZERO, Size::new(1000.0, 800.0));
        assert!((t.scale() - 1.0).abs() < EPS);
        let p = Point::new(10.0, 10.0);
        let back = t.to_image(t.to_canvas(p));
        assert!(back.x.is_finite() && approx(back, p));
    }

    #[test]
    fn test_rect_transform() {
        let t = CoordinateTransform::new(Size::new(500.0, 400.0), Size::new(1000.0, 800.0));
        let r = t.rect_to_canvas(Rect::new(100.0, 100.0, 300.0, 200.0));
        assert_eq!(r, Rect::new(50.0, 50.0, 150.0, 100.0));
        assert_eq!(t.rect_to_image(r), Rect::new(100.0, 100.0, 300.0, 200.0));
    }

    #[test]
    fn test_bounds_check_in_image_space() {
        let t = CoordinateTransform::new(Size::new(1000.0, 400.0), Size::new(1000.0, 800.0));
        assert!(!t.contains_canvas_point(Point::new(100.0, 200.0)));
        assert!(t.contains_canvas_point(Point::new(500.0, 200.0)));
    }
}
