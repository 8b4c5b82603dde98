//! In-memory object store handler for testing.

use async_trait::async_trait;
use plaza_core::effects::{ObjectStoreEffects, ObjectStoreError};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// An uploaded object held by [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Raw bytes as uploaded
    pub bytes: Vec<u8>,
    /// Declared content type
    pub content_type: String,
}

/// In-memory object store. Uploads land in a map and resolve to
/// `memory://<path>` URLs.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// The object uploaded at `path`, if any.
    pub async fn object(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().await.get(path).cloned()
    }

    /// Number of uploaded objects.
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStoreEffects for MemoryObjectStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        self.objects.write().await.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("memory://{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_returns_retrievable_url() {
        let store = MemoryObjectStore::new();
        let url = store
            .upload("images/u1/1_pic.png", vec![1, 2, 3], "image/png")
            .await
            .expect("upload");
        assert_eq!(url, "memory://images/u1/1_pic.png");

        let object = store.object("images/u1/1_pic.png").await.expect("object");
        assert_eq!(object.bytes, vec![1, 2, 3]);
        assert_eq!(object.content_type, "image/png");
    }
}
