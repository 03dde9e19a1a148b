//! Storage configuration types.

use serde::{Deserialize, Serialize};

use crate::{S3Config, TRACING_TARGET};

/// Default host component of memory backend URLs.
const DEFAULT_MEMORY_NAME: &str = "exhibit";

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Amazon S3 compatible storage.
    S3(S3Config),
    /// In-process memory storage; contents are lost on restart.
    Memory(MemoryConfig),
}

/// In-process memory storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Host component of the `memory://<name>/<key>` URLs handed out.
    pub name: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MEMORY_NAME.to_owned(),
        }
    }
}

impl StorageConfig {
    /// Creates a memory backend configuration with default settings.
    pub fn memory() -> Self {
        Self::Memory(MemoryConfig::default())
    }

    /// Uses S3 when the configuration is complete, otherwise memory.
    ///
    /// Falling back logs a warning: images then live only as long as the process.
    pub fn s3_or_memory(s3: S3Config) -> Self {
        if s3.is_configured() {
            tracing::info!(
                target: TRACING_TARGET,
                bucket = s3.bucket.as_deref().unwrap_or_default(),
                region = s3.region.as_deref().unwrap_or_default(),
                "S3 storage is configured"
            );
            return Self::S3(s3);
        }

        tracing::warn!(
            target: TRACING_TARGET,
            "S3 is not configured, falling back to in-memory image storage"
        );
        Self::memory()
    }

    /// Returns the backend name as a static string.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::S3(_) => "s3",
            Self::Memory(_) => "memory",
        }
    }
}
