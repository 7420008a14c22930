use async_trait::async_trait;
use lyra_core::error::{LyraError, Result};
use lyra_core::traits::BlobStore;

use crate::MemoryStore;

/// URL scheme of blobs held by [`MemoryStore`]
pub const BLOB_SCHEME: &str = "memory://";

impl MemoryStore {
    /// Bytes stored under `path`
    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.state().blobs.get(path).cloned()
    }

    /// Number of stored blobs
    pub fn blob_count(&self) -> usize {
        self.state().blobs.len()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload_blob(&self, path: &str, bytes: Vec<u8>) -> Result<String> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Err(LyraError::Upload("empty blob path".to_string()));
        }
        let size = bytes.len();
        self.state().blobs.insert(path.to_string(), bytes);
        tracing::debug!(path, size, "Blob stored");
        Ok(format!("{BLOB_SCHEME}{path}"))
    }
}
