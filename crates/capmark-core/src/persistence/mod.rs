//! Persistence of annotations in normalized image coordinates.
//!
//! The engine encodes annotations to [`AnnotationRecord`]s and hands them to
//! an [`AnnotationStore`] as plain JSON values. Anything that fails to decode
//! is skipped on load.

mod memory;
mod record;

pub use memory::MemoryStore;
pub use record::{AnnotationRecord, decode_records, encode_records};

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Capture not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for store operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Backend holding the annotation records of each capture.
pub trait AnnotationStore: Send + Sync {
    /// Replace the records stored for a capture.
    fn save(&self, capture_id: &str, records: &[serde_json::Value]) -> BoxFuture<'_, StoreResult<()>>;

    /// Load the raw records of a capture.
    fn load(&self, capture_id: &str) -> BoxFuture<'_, StoreResult<Vec<serde_json::Value>>>;

    fn delete(&self, capture_id: &str) -> BoxFuture<'_, StoreResult<()>>;

    /// List the ids of all captures with stored records.
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<String>>>;

    fn exists(&self, capture_id: &str) -> BoxFuture<'_, StoreResult<bool>>;
}
