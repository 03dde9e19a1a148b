#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod backend;
mod config;
mod error;
mod key;
mod s3;

pub use backend::{StorageBackend, StoredBlob};
pub use config::{MemoryConfig, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use key::ObjectKey;
pub use s3::S3Config;

/// Tracing target for storage operations.
pub const TRACING_TARGET: &str = "exhibit_opendal";
