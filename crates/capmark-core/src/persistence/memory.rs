//! In-memory store.

use super::{AnnotationStore, BoxFuture, StoreError, StoreResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Captures = HashMap<String, Vec<Value>>;

/// Records per capture, held for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    captures: RwLock<Captures>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Captures>> {
        self.captures
            .read()
            .map_err(|e| StoreError::Other(format!("Poisoned capture lock: {e}")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Captures>> {
        self.captures
            .write()
            .map_err(|e| StoreError::Other(format!("Poisoned capture lock: {e}")))
    }
}

impl AnnotationStore for MemoryStore {
    fn save(&self, capture_id: &str, records: &[Value]) -> BoxFuture<'_, StoreResult<()>> {
        let entry = (capture_id.to_string(), records.to_vec());
        Box::pin(async move {
            let (capture_id, records) = entry;
            self.write()?.insert(capture_id, records);
            Ok(())
        })
    }

    fn load(&self, capture_id: &str) -> BoxFuture<'_, StoreResult<Vec<Value>>> {
        let capture_id = capture_id.to_string();
        Box::pin(async move {
            let records = self.read()?.get(&capture_id).cloned();
            records.ok_or(StoreError::NotFound(capture_id))
        })
    }

    fn delete(&self, capture_id: &str) -> BoxFuture<'_, StoreResult<()>> {
        let capture_id = capture_id.to_string();
        Box::pin(async move {
            if self.write()?.remove(&capture_id).is_none() {
                log::debug!("Nothing stored for capture {capture_id}");
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<String>>> {
        Box::pin(async move { Ok(self.read()?.keys().cloned().collect()) })
    }

    fn exists(&self, capture_id: &str) -> BoxFuture<'_, StoreResult<bool>> {
        let capture_id = capture_id.to_string();
        Box::pin(async move { Ok(self.read()?.contains_key(&capture_id)) })
    }
}
