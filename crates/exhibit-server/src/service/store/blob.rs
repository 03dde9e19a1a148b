use bytes::Bytes;
use exhibit_opendal::{ObjectKey, StorageBackend, StoredBlob};

use super::StoreResult;

/// Object storage for image bytes.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `data` under `key` with the given content type.
    async fn put(&self, key: &ObjectKey, data: Bytes, content_type: &str)
    -> StoreResult<StoredBlob>;

    /// Removes the blob stored under `key`.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}

#[async_trait::async_trait]
impl BlobStore for StorageBackend {
    async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> StoreResult<StoredBlob> {
        Ok(StorageBackend::put(self, key, data, content_type).await?)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        Ok(StorageBackend::delete(self, key).await?)
    }
}
