//! Storage backend implementation.

use bytes::Bytes;
use opendal::{Operator, services};
use url::Url;

use crate::config::{MemoryConfig, StorageConfig};
use crate::error::{StorageError, StorageResult};
use crate::{ObjectKey, S3Config, TRACING_TARGET};

/// A blob that has been written: where it lives and how to fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Storage key the bytes were written under.
    pub key: String,
    /// Retrievable URL of the blob.
    pub url: String,
}

/// Storage backend that wraps an OpenDAL operator.
#[derive(Debug, Clone)]
pub struct StorageBackend {
    operator: Operator,
    public_base: Url,
    config: StorageConfig,
}

impl StorageBackend {
    /// Creates a new storage backend from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let operator = Self::create_operator(&config)?;
        let public_base = Self::public_base(&config)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = config.backend_name(),
            public_base = %public_base,
            "Storage backend initialized"
        );

        Ok(Self {
            operator,
            public_base,
            config,
        })
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Writes `data` under `key` and returns the key with its public URL.
    pub async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<StoredBlob> {
        let path = key.as_str();
        let size = data.len();

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size,
            content_type,
            "Writing blob"
        );

        let writer = self.operator.write_with(path, data);
        if self
            .operator
            .info()
            .full_capability()
            .write_with_content_type
        {
            writer.content_type(content_type).await?;
        } else {
            writer.await?;
        }

        let url = self.url_for(key)?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            url = %url,
            "Blob write complete"
        );

        Ok(StoredBlob {
            key: path.to_owned(),
            url,
        })
    }

    /// Reads a blob from storage.
    pub async fn read(&self, path: &str) -> StorageResult<Bytes> {
        let data = self.operator.read(path).await?.to_bytes();

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "Blob read complete"
        );

        Ok(data)
    }

    /// Deletes a blob from storage.
    ///
    /// Deleting a key that does not exist succeeds.
    pub async fn delete(&self, path: &str) -> StorageResult<()> {
        tracing::debug!(target: TRACING_TARGET, path = %path, "Deleting blob");
        self.operator.delete(path).await?;
        Ok(())
    }

    /// Checks if a blob exists.
    pub async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.operator.exists(path).await?)
    }

    /// Returns the public URL of a key.
    pub fn url_for(&self, key: &ObjectKey) -> StorageResult<String> {
        self.public_base
            .join(key.as_str())
            .map(String::from)
            .map_err(|e| StorageError::init(format!("invalid blob url for {key}: {e}")))
    }

    fn public_base(config: &StorageConfig) -> StorageResult<Url> {
        let base = match config {
            StorageConfig::S3(s3) => s3
                .public_base_url()
                .ok_or_else(|| StorageError::init("S3 bucket and region are required"))?,
            StorageConfig::Memory(MemoryConfig { name }) => format!("memory://{name}/"),
        };

        // `Url::join` replaces the last segment unless the base ends with a slash.
        let base = if base.ends_with('/') {
            base
        } else {
            format!("{base}/")
        };

        Url::parse(&base).map_err(|e| StorageError::init(format!("invalid public url: {e}")))
    }

    /// Creates an OpenDAL operator based on configuration.
    fn create_operator(config: &StorageConfig) -> StorageResult<Operator> {
        match config {
            StorageConfig::S3(s3) => Self::create_s3_operator(s3),
            StorageConfig::Memory(_) => Operator::new(services::Memory::default())
                .map(|op| op.finish())
                .map_err(|e| StorageError::init(e.to_string())),
        }
    }

    #[cfg(feature = "s3")]
    fn create_s3_operator(config: &S3Config) -> StorageResult<Operator> {
        let required = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| StorageError::init(format!("S3 {name} is not configured")))
        };

        let mut builder = services::S3::default()
            .bucket(&required(&config.bucket, "bucket")?)
            .region(&required(&config.region, "region")?);

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint(endpoint);
        }

        if let Some(ref access_key_id) = config.access_key_id {
            builder = builder.access_key_id(access_key_id);
        }

        if let Some(ref secret_access_key) = config.secret_access_key {
            builder = builder.secret_access_key(secret_access_key);
        }

        Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| StorageError::init(e.to_string()))
    }

    #[cfg(not(feature = "s3"))]
    fn create_s3_operator(_config: &S3Config) -> StorageResult<Operator> {
        Err(StorageError::init(
            "S3 support is not enabled, rebuild with the `s3` feature",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_backend() -> StorageBackend {
        StorageBackend::new(StorageConfig::memory()).unwrap()
    }

    #[tokio::test]
    async fn put_then_read() {
        let backend = memory_backend();
        let key = ObjectKey::for_upload(Some("chair.jpg"), "image/jpeg");

        let blob = backend
            .put(&key, Bytes::from_static(b"jpeg bytes"), "image/jpeg")
            .await
            .unwrap();

        assert_eq!(blob.key, key.as_str());
        assert_eq!(blob.url, format!("memory://exhibit/{key}"));
        assert_eq!(backend.read(&blob.key).await.unwrap(), "jpeg bytes");
    }

    #[tokio::test]
    async fn delete_removes_blob() {
        let backend = memory_backend();
        let key = ObjectKey::generate("png");

        backend
            .put(&key, Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        assert!(backend.exists(key.as_str()).await.unwrap());

        backend.delete(key.as_str()).await.unwrap();
        assert!(!backend.exists(key.as_str()).await.unwrap());
        backend.delete(key.as_str()).await.unwrap();
    }

    #[tokio::test]
    async fn read_missing_blob_is_not_found() {
        let backend = memory_backend();
        let err = backend.read("objects/missing.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn s3_public_url_uses_virtual_hosted_style() {
        let config = StorageConfig::S3(S3Config::new("exhibit-images", "eu-central-1"));
        let base = StorageBackend::public_base(&config).unwrap();
        let url = base.join("objects/1-2.png").unwrap();
        assert_eq!(
            url.as_str(),
            "https://exhibit-images.s3.eu-central-1.amazonaws.com/objects/1-2.png"
        );
    }

    #[test]
    fn public_url_override_keeps_path() {
        let config = StorageConfig::S3(
            S3Config::new("exhibit-images", "eu-central-1")
                .with_public_url("https://cdn.example.com/images"),
        );
        let base = StorageBackend::public_base(&config).unwrap();
        let url = base.join("objects/1-2.png").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/images/objects/1-2.png");
    }
}
