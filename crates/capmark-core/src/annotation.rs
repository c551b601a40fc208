//! The annotation entity.
//!
//! An [`Annotation`] is immutable once created. Edits produce a replacement
//! with the same id; the history layer swaps whole values rather than mutating
//! them in place.

use crate::color::SerializableColor;
use crate::geometry::{ArrowGeometry, RectGeometry, TextGeometry};
use crate::properties::{
    ArrowProperties, BlurProperties, HighlightProperties, RectangleProperties, TextProperties,
};
use chrono::{DateTime, Utc};
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for annotations.
pub type AnnotationId = Uuid;

/// The closed set of annotation (and tool) types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    #[default]
    Arrow,
    Text,
    Rectangle,
    Highlight,
    Blur,
}

impl AnnotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Arrow => "arrow",
            AnnotationKind::Text => "text",
            AnnotationKind::Rectangle => "rectangle",
            AnnotationKind::Highlight => "highlight",
            AnnotationKind::Blur => "blur",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "arrow" => Some(AnnotationKind::Arrow),
            "text" => Some(AnnotationKind::Text),
            "rectangle" => Some(AnnotationKind::Rectangle),
            "highlight" => Some(AnnotationKind::Highlight),
            "blur" => Some(AnnotationKind::Blur),
            _ => None,
        }
    }

    pub fn all() -> &'static [AnnotationKind] {
        &[
            AnnotationKind::Arrow,
            AnnotationKind::Text,
            AnnotationKind::Rectangle,
            AnnotationKind::Highlight,
            AnnotationKind::Blur,
        ]
    }
}

/// Properties and geometry of one annotation, paired per type so the two can
/// never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationShape {
    Arrow {
        properties: ArrowProperties,
        geometry: ArrowGeometry,
    },
    Text {
        properties: TextProperties,
        geometry: TextGeometry,
    },
    Rectangle {
        properties: RectangleProperties,
        geometry: RectGeometry,
    },
    Highlight {
        properties: HighlightProperties,
        geometry: RectGeometry,
    },
    Blur {
        properties: BlurProperties,
        geometry: RectGeometry,
    },
}

impl AnnotationShape {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            AnnotationShape::Arrow { .. } => AnnotationKind::Arrow,
            AnnotationShape::Text { .. } => AnnotationKind::Text,
            AnnotationShape::Rectangle { .. } => AnnotationKind::Rectangle,
            AnnotationShape::Highlight { .. } => AnnotationKind::Highlight,
            AnnotationShape::Blur { .. } => AnnotationKind::Blur,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            AnnotationShape::Arrow { geometry, .. } => geometry.bounds(),
            AnnotationShape::Text { geometry, .. } => geometry.bounds(),
            AnnotationShape::Rectangle { geometry, .. }
            | AnnotationShape::Highlight { geometry, .. }
            | AnnotationShape::Blur { geometry, .. } => geometry.bounds(),
        }
    }

    pub fn color(&self) -> SerializableColor {
        match self {
            AnnotationShape::Arrow { properties, .. } => properties.color,
            AnnotationShape::Text { properties, .. } => properties.color,
            AnnotationShape::Rectangle { properties, .. } => properties.color,
            AnnotationShape::Highlight { properties, .. } => properties.color,
            AnnotationShape::Blur { properties, .. } => properties.color,
        }
    }

    pub fn thickness(&self) -> f64 {
        match self {
            AnnotationShape::Arrow { properties, .. } => properties.thickness,
            AnnotationShape::Text { properties, .. } => properties.thickness,
            AnnotationShape::Rectangle { properties, .. } => properties.thickness,
            AnnotationShape::Highlight { properties, .. } => properties.thickness,
            AnnotationShape::Blur { properties, .. } => properties.thickness,
        }
    }

    /// Same shape moved by `delta` in image space.
    pub fn translated(&self, delta: Vec2) -> Self {
        match self {
            AnnotationShape::Arrow { properties, geometry } => AnnotationShape::Arrow {
                properties: properties.clone(),
                geometry: geometry.translated(delta),
            },
            AnnotationShape::Text { properties, geometry } => AnnotationShape::Text {
                properties: properties.clone(),
                geometry: geometry.translated(delta),
            },
            AnnotationShape::Rectangle { properties, geometry } => AnnotationShape::Rectangle {
                properties: properties.clone(),
                geometry: geometry.translated(delta),
            },
            AnnotationShape::Highlight { properties, geometry } => AnnotationShape::Highlight {
                properties: properties.clone(),
                geometry: geometry.translated(delta),
            },
            AnnotationShape::Blur { properties, geometry } => AnnotationShape::Blur {
                properties: properties.clone(),
                geometry: geometry.translated(delta),
            },
        }
    }
}

/// A single drawable annotation on a captured image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    id: AnnotationId,
    timestamp: DateTime<Utc>,
    shape: AnnotationShape,
}

impl Annotation {
    /// Create a new annotation with a fresh id and the current time.
    pub fn new(shape: AnnotationShape) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            shape,
        }
    }

    /// Rebuild an annotation with a known identity (for storage).
    pub fn reconstruct(id: AnnotationId, timestamp: DateTime<Utc>, shape: AnnotationShape) -> Self {
        Self { id, timestamp, shape }
    }

    pub fn arrow(properties: ArrowProperties, geometry: ArrowGeometry) -> Self {
        Self::new(AnnotationShape::Arrow { properties, geometry })
    }

    pub fn text(properties: TextProperties, geometry: TextGeometry) -> Self {
        Self::new(AnnotationShape::Text { properties, geometry })
    }

    pub fn rectangle(properties: RectangleProperties, geometry: RectGeometry) -> Self {
        Self::new(AnnotationShape::Rectangle { properties, geometry })
    }

    pub fn highlight(properties: HighlightProperties, geometry: RectGeometry) -> Self {
        Self::new(AnnotationShape::Highlight { properties, geometry })
    }

    pub fn blur(properties: BlurProperties, geometry: RectGeometry) -> Self {
        Self::new(AnnotationShape::Blur { properties, geometry })
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn shape(&self) -> &AnnotationShape {
        &self.shape
    }

    pub fn kind(&self) -> AnnotationKind {
        self.shape.kind()
    }

    pub fn bounds(&self) -> Rect {
        self.shape.bounds()
    }

    pub fn color(&self) -> SerializableColor {
        self.shape.color()
    }

    pub fn thickness(&self) -> f64 {
        self.shape.thickness()
    }

    /// Replacement value keeping this annotation's id and timestamp.
    pub fn with_shape(&self, shape: AnnotationShape) -> Self {
        Self {
            id: self.id,
            timestamp: self.timestamp,
            shape,
        }
    }

    /// Replacement value moved by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        self.with_shape(self.shape.translated(delta))
    }
}
