//! Normalized record format.

use crate::annotation::{Annotation, AnnotationId, AnnotationKind, AnnotationShape};
use crate::color::SerializableColor;
use crate::geometry::{ArrowGeometry, RectGeometry, TextGeometry};
use crate::properties::{
    ArrowProperties, ArrowheadStyle, BlurProperties, FontWeight, HighlightProperties,
    RectangleProperties, TextProperties,
};
use chrono::{DateTime, Utc};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// One persisted annotation. Positions are fractions of the image size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub id: AnnotationId,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub normalized_x: f64,
    #[serde(default)]
    pub normalized_y: f64,
    #[serde(default)]
    pub normalized_width: f64,
    #[serde(default)]
    pub normalized_height: f64,
    /// `#RRGGBB`. Anything else decodes to the default color.
    #[serde(default)]
    pub color_hex: Value,
    #[serde(default)]
    pub thickness: Value,
    #[serde(default)]
    pub properties_blob: Value,
}

/// Divisor for an image dimension, never zero.
fn extent(value: f64) -> f64 {
    if value > 0.0 { value } else { 1.0 }
}

/// A normalized coordinate, clamped onto the image.
fn unit(value: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}

fn blob_f64(blob: &Value, key: &str) -> Option<f64> {
    blob.get(key).and_then(Value::as_f64)
}

fn blob_str<'a>(blob: &'a Value, key: &str) -> Option<&'a str> {
    blob.get(key).and_then(Value::as_str)
}

fn blob_bool(blob: &Value, key: &str) -> bool {
    blob.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn blob_color(blob: &Value, key: &str) -> Option<SerializableColor> {
    blob_str(blob, key).and_then(SerializableColor::from_hex)
}

impl AnnotationRecord {
    /// Encode an annotation against the size of the image it annotates.
    pub fn encode(annotation: &Annotation, image_size: Size) -> Self {
        let bounds = annotation.bounds();
        let (width, height) = (extent(image_size.width), extent(image_size.height));

        let mut blob = Map::new();
        match annotation.shape() {
            AnnotationShape::Arrow { properties, geometry } => {
                blob.insert("arrowheadStyle".into(), json!(properties.arrowhead_style.as_str()));
                blob.insert("flipX".into(), json!(geometry.start.x > geometry.end.x));
                blob.insert("flipY".into(), json!(geometry.start.y > geometry.end.y));
            }
            AnnotationShape::Text { properties, .. } => {
                blob.insert("text".into(), json!(properties.text));
                blob.insert("fontSize".into(), json!(properties.font_size));
                blob.insert("fontWeight".into(), json!(properties.font_weight.as_str()));
                if let Some(background) = properties.background_color {
                    blob.insert("backgroundColor".into(), json!(background.to_hex()));
                }
            }
            AnnotationShape::Rectangle { properties, .. } => {
                blob.insert("fillOpacity".into(), json!(properties.fill_opacity));
                if let Some(fill) = properties.fill_color {
                    blob.insert("fillColor".into(), json!(fill.to_hex()));
                }
            }
            AnnotationShape::Highlight { properties, .. } => {
                blob.insert("opacity".into(), json!(properties.opacity));
            }
            AnnotationShape::Blur { properties, .. } => {
                blob.insert("blurRadius".into(), json!(properties.blur_radius));
            }
        }

        Self {
            id: annotation.id(),
            kind: annotation.kind().as_str().to_string(),
            timestamp: annotation.timestamp(),
            normalized_x: bounds.x0 / width,
            normalized_y: bounds.y0 / height,
            normalized_width: bounds.width() / width,
            normalized_height: bounds.height() / height,
            color_hex: json!(annotation.color().to_hex()),
            thickness: json!(annotation.thickness()),
            properties_blob: Value::Object(blob),
        }
    }

    /// Rebuild the annotation against the current image size. Returns `None`
    /// for an unknown type; bad fields fall back to defaults and bounds are
    /// clamped onto the image.
    pub fn decode(&self, image_size: Size) -> Option<Annotation> {
        let kind = AnnotationKind::parse(&self.kind)?;
        let (x, y) = (unit(self.normalized_x), unit(self.normalized_y));
        let bounds = Rect::from_origin_size(
            Point::new(x * image_size.width, y * image_size.height),
            Size::new(
                unit(self.normalized_width).min(1.0 - x) * image_size.width,
                unit(self.normalized_height).min(1.0 - y) * image_size.height,
            ),
        );
        let blob = &self.properties_blob;
        let color = self.color_hex.as_str().and_then(SerializableColor::from_hex);
        let thickness = self.thickness.as_f64().filter(|t| t.is_finite() && *t > 0.0);

        let shape = match kind {
            AnnotationKind::Arrow => {
                let defaults = ArrowProperties::default();
                let properties = ArrowProperties {
                    color: color.unwrap_or(defaults.color),
                    thickness: thickness.unwrap_or(defaults.thickness),
                    arrowhead_style: blob_str(blob, "arrowheadStyle")
                        .and_then(ArrowheadStyle::parse)
                        .unwrap_or(defaults.arrowhead_style),
                };
                let (x_start, x_end) = if blob_bool(blob, "flipX") {
                    (bounds.x1, bounds.x0)
                } else {
                    (bounds.x0, bounds.x1)
                };
                let (y_start, y_end) = if blob_bool(blob, "flipY") {
                    (bounds.y1, bounds.y0)
                } else {
                    (bounds.y0, bounds.y1)
                };
                AnnotationShape::Arrow {
                    properties,
                    geometry: ArrowGeometry::new(
                        Point::new(x_start, y_start),
                        Point::new(x_end, y_end),
                    ),
                }
            }
            AnnotationKind::Text => {
                let defaults = TextProperties::default();
                let properties = TextProperties {
                    color: color.unwrap_or(defaults.color),
                    thickness: thickness.unwrap_or(defaults.thickness),
                    font_size: blob_f64(blob, "fontSize").unwrap_or(defaults.font_size),
                    text: blob_str(blob, "text").unwrap_or_default().to_string(),
                    background_color: blob_color(blob, "backgroundColor"),
                    font_weight: blob_str(blob, "fontWeight")
                        .and_then(FontWeight::parse)
                        .unwrap_or(defaults.font_weight),
                };
                AnnotationShape::Text {
                    properties,
                    geometry: TextGeometry::new(bounds.origin(), bounds.size()),
                }
            }
            AnnotationKind::Rectangle => {
                let defaults = RectangleProperties::default();
                let properties = RectangleProperties {
                    color: color.unwrap_or(defaults.color),
                    thickness: thickness.unwrap_or(defaults.thickness),
                    fill_color: blob_color(blob, "fillColor"),
                    fill_opacity: blob_f64(blob, "fillOpacity").unwrap_or(defaults.fill_opacity),
                };
                AnnotationShape::Rectangle {
                    properties,
                    geometry: RectGeometry::from_rect(bounds),
                }
            }
            AnnotationKind::Highlight => {
                let defaults = HighlightProperties::default();
                let properties = HighlightProperties {
                    color: color.unwrap_or(defaults.color),
                    thickness: thickness.unwrap_or(defaults.thickness),
                    opacity: blob_f64(blob, "opacity").unwrap_or(defaults.opacity),
                };
                AnnotationShape::Highlight {
                    properties,
                    geometry: RectGeometry::from_rect(bounds),
                }
            }
            AnnotationKind::Blur => {
                let defaults = BlurProperties::default();
                let properties = BlurProperties {
                    color: color.unwrap_or(defaults.color),
                    thickness: thickness.unwrap_or(defaults.thickness),
                    blur_radius: blob_f64(blob, "blurRadius").unwrap_or(defaults.blur_radius),
                };
                AnnotationShape::Blur {
                    properties,
                    geometry: RectGeometry::from_rect(bounds),
                }
            }
        };

        Some(Annotation::reconstruct(self.id, self.timestamp, shape))
    }

    /// Parse and decode a raw stored value. Malformed records log a warning
    /// and yield `None`.
    pub fn decode_value(value: &Value, image_size: Size) -> Option<Annotation> {
        let record: Self = match serde_json::from_value(value.clone()) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping malformed annotation record: {e}");
                return None;
            }
        };
        let annotation = record.decode(image_size);
        if annotation.is_none() {
            log::warn!("Skipping annotation record {} with unknown type {:?}", record.id, record.kind);
        }
        annotation
    }
}

/// Encode every annotation to raw JSON values, ready for a store.
pub fn encode_records(annotations: &[Annotation], image_size: Size) -> Vec<Value> {
    annotations
        .iter()
        .filter_map(|annotation| {
            let record = AnnotationRecord::encode(annotation, image_size);
            match serde_json::to_value(&record) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("Failed to encode annotation {}: {e}", annotation.id());
                    None
                }
            }
        })
        .collect()
}

/// Decode raw records, skipping any that are malformed.
pub fn decode_records(values: &[Value], image_size: Size) -> Vec<Annotation> {
    values
        .iter()
        .filter_map(|value| AnnotationRecord::decode_value(value, image_size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: Size = Size::new(1000.0, 800.0);

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn rounded_arrow() -> Annotation {
        Annotation::arrow(
            ArrowProperties {
                color: SerializableColor::red(),
                thickness: 3.0,
                arrowhead_style: ArrowheadStyle::Rounded,
            },
            ArrowGeometry::new(Point::new(100.0, 100.0), Point::new(300.0, 200.0)),
        )
    }

    #[test]
    fn test_arrow_encodes_normalized() {
        let record = AnnotationRecord::encode(&rounded_arrow(), IMAGE);
        assert!(approx(record.normalized_x, 0.1));
        assert!(approx(record.normalized_y, 0.125));
        assert!(approx(record.normalized_width, 0.2));
        assert!(approx(record.normalized_height, 0.125));
        assert_eq!(record.color_hex, "#FF0000");
        assert_eq!(record.kind, "arrow");
        assert_eq!(record.properties_blob["arrowheadStyle"], "rounded");
    }

    #[test]
    fn test_arrow_decodes_same_bounds() {
        let arrow = rounded_arrow();
        let decoded = AnnotationRecord::encode(&arrow, IMAGE).decode(IMAGE).unwrap();
        assert_eq!(decoded.id(), arrow.id());
        let bounds = decoded.bounds();
        assert!(approx(bounds.x0, 100.0) && approx(bounds.y0, 100.0));
        assert!(approx(bounds.width(), 200.0) && approx(bounds.height(), 100.0));
        match decoded.shape() {
            AnnotationShape::Arrow { properties, .. } => {
                assert_eq!(properties.arrowhead_style, ArrowheadStyle::Rounded);
            }
            other => panic!("expected arrow, got {other:?}"),
        }
    }

    #[test]
    fn test_arrow_direction_survives() {
        let arrow = Annotation::arrow(
            ArrowProperties::default(),
            ArrowGeometry::new(Point::new(300.0, 200.0), Point::new(100.0, 100.0)),
        );
        let decoded = AnnotationRecord::encode(&arrow, IMAGE).decode(IMAGE).unwrap();
        let AnnotationShape::Arrow { geometry, .. } = decoded.shape() else {
            panic!("expected arrow");
        };
        assert!(approx(geometry.start.x, 300.0) && approx(geometry.start.y, 200.0));
        assert!(approx(geometry.end.x, 100.0) && approx(geometry.end.y, 100.0));
    }

    #[test]
    fn test_decode_scales_to_current_image() {
        let record = AnnotationRecord::encode(&rounded_arrow(), IMAGE);
        let decoded = record.decode(Size::new(500.0, 400.0)).unwrap();
        assert!(approx(decoded.bounds().x0, 50.0));
        assert!(approx(decoded.bounds().width(), 100.0));
    }

    #[test]
    fn test_text_blob_roundtrip() {
        let text = Annotation::text(
            TextProperties {
                text: "Look here".to_string(),
                font_size: 24.0,
                font_weight: FontWeight::Bold,
                background_color: Some(SerializableColor::white()),
                ..TextProperties::default()
            },
            TextGeometry::new(Point::new(10.0, 10.0), Size::new(120.0, 30.0)),
        );
        let decoded = AnnotationRecord::encode(&text, IMAGE).decode(IMAGE).unwrap();
        let AnnotationShape::Text { properties, .. } = decoded.shape() else {
            panic!("expected text");
        };
        assert_eq!(properties.text, "Look here");
        assert_eq!(properties.font_weight, FontWeight::Bold);
        assert_eq!(properties.background_color, Some(SerializableColor::white()));
        assert!(approx(properties.font_size, 24.0));
    }

    #[test]
    fn test_bad_blob_falls_back_per_field() {
        let value = json!({
            "id": uuid::Uuid::new_v4(),
            "type": "highlight",
            "timestamp": "2024-05-01T12:00:00Z",
            "normalizedX": 0.5,
            "normalizedY": 0.5,
            "normalizedWidth": 0.1,
            "normalizedHeight": 0.1,
            "colorHex": "not a color",
            "propertiesBlob": {"opacity": "very"}
        });
        let decoded = AnnotationRecord::decode_value(&value, IMAGE).unwrap();
        let AnnotationShape::Highlight { properties, .. } = decoded.shape() else {
            panic!("expected highlight");
        };
        assert_eq!(*properties, HighlightProperties::default());
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let good = serde_json::to_value(AnnotationRecord::encode(&rounded_arrow(), IMAGE)).unwrap();
        let mut unknown = good.clone();
        unknown["type"] = json!("ellipse");
        let mut no_id = good.clone();
        no_id.as_object_mut().unwrap().remove("id");
        let mut no_timestamp = good.clone();
        no_timestamp.as_object_mut().unwrap().remove("timestamp");

        let decoded = decode_records(&[unknown, good, no_id, json!("garbage"), no_timestamp], IMAGE);
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_wrong_typed_color_and_thickness_fall_back() {
        let value = json!({
            "id": uuid::Uuid::new_v4(),
            "type": "rectangle",
            "timestamp": "2024-05-01T12:00:00Z",
            "normalizedX": 0.1,
            "normalizedY": 0.1,
            "normalizedWidth": 0.2,
            "normalizedHeight": 0.2,
            "colorHex": 16711680,
            "thickness": "3",
            "propertiesBlob": {"fillOpacity": 0.5}
        });
        let decoded = AnnotationRecord::decode_value(&value, IMAGE).unwrap();
        let AnnotationShape::Rectangle { properties, .. } = decoded.shape() else {
            panic!("expected rectangle");
        };
        let defaults = RectangleProperties::default();
        assert_eq!(properties.color, defaults.color);
        assert!(approx(properties.thickness, defaults.thickness));
        assert!(approx(properties.fill_opacity, 0.5));
    }

    #[test]
    fn test_out_of_range_bounds_are_clamped_to_image() {
        let value = json!({
            "id": uuid::Uuid::new_v4(),
            "type": "blur",
            "timestamp": "2024-05-01T12:00:00Z",
            "normalizedX": -3.0,
            "normalizedY": 0.75,
            "normalizedWidth": 5000.0,
            "normalizedHeight": 5000.0,
            "colorHex": "#000000",
            "thickness": 2.0,
            "propertiesBlob": {"blurRadius": 10.0}
        });
        let decoded = AnnotationRecord::decode_value(&value, IMAGE).unwrap();
        let bounds = decoded.bounds();
        assert!(approx(bounds.x0, 0.0) && approx(bounds.x1, 1000.0));
        assert!(approx(bounds.y0, 600.0) && approx(bounds.y1, 800.0));
    }

    #[test]
    fn test_zero_image_size_does_not_produce_nan() {
        let record = AnnotationRecord::encode(&rounded_arrow(), Size::ZERO);
        assert!(record.normalized_x.is_finite());
    }
}
