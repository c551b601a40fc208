//! Capmark Core Library
//!
//! Annotation engine for screenshots: tools that turn pointer drags into
//! arrows, text, rectangles, highlights and blur regions, an undoable history,
//! and a normalized record format for persistence.

pub mod annotation;
pub mod color;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod history;
pub mod persistence;
pub mod properties;
pub mod render;
pub mod tools;
pub mod transform;

pub use annotation::{Annotation, AnnotationId, AnnotationKind, AnnotationShape};
pub use color::SerializableColor;
pub use config::{ConfigError, EngineConfig};
pub use engine::AnnotationEngine;
pub use geometry::{ArrowGeometry, RectGeometry, TextGeometry};
pub use history::{Command, HistoryManager, MAX_UNDO_HISTORY};
pub use persistence::{AnnotationRecord, AnnotationStore, MemoryStore, StoreError, StoreResult};
pub use properties::{
    ArrowProperties, ArrowheadStyle, BlurProperties, FontWeight, HighlightProperties,
    RectangleProperties, TextProperties,
};
pub use render::{ApproximateMeasurer, GraphicsContext, RecordingContext, TextMeasurer, TextRun};
pub use tools::{Tool, ToolKind, ToolState};
pub use transform::CoordinateTransform;
