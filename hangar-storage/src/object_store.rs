//! Object store contract for picture blobs, plus an in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use hangar_core::{HangarResult, ObjectStoreError, StorageError};

/// Blob store addressed by object name inside one bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket every object lives in.
    fn bucket(&self) -> &str;

    /// Store `bytes` under `name` and return the object's location.
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> HangarResult<String>;

    /// Remove the named objects. Unknown names are ignored.
    async fn delete_objects(&self, names: &[String]) -> HangarResult<()>;
}

/// In-memory [`ObjectStore`] used for development and tests.
#[derive(Debug, Clone)]
pub struct InMemoryObjectStore {
    bucket: String,
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn contains(&self, name: &str) -> HangarResult<bool> {
        let objects = self.objects.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(objects.contains_key(name))
    }

    pub fn object_count(&self) -> HangarResult<usize> {
        let objects = self.objects.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(objects.len())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(&self, name: &str, bytes: Vec<u8>) -> HangarResult<String> {
        if name.is_empty() {
            return Err(ObjectStoreError::UploadFailed {
                bucket: self.bucket.clone(),
                name: name.to_string(),
                reason: "empty object name".to_string(),
            }
            .into());
        }
        let mut objects = self.objects.write().map_err(|_| StorageError::LockPoisoned)?;
        objects.insert(name.to_string(), bytes);
        Ok(format!("memory://{}/{}", self.bucket, name))
    }

    async fn delete_objects(&self, names: &[String]) -> HangarResult<()> {
        let mut objects = self.objects.write().map_err(|_| StorageError::LockPoisoned)?;
        for name in names {
            objects.remove(name);
        }
        Ok(())
    }
}
