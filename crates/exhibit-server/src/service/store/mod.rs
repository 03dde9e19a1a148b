//! Persistence seams for the object registry.
//!
//! The registry reaches metadata through [`MetadataStore`] and image bytes
//! through [`BlobStore`]. Production wiring uses [`PgMetadataStore`] and
//! [`exhibit_opendal::StorageBackend`]; tests swap in [`MemoryMetadataStore`]
//! and the OpenDAL memory service.

mod blob;
mod error;
mod memory;
mod postgres;
mod record;

pub use blob::BlobStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryMetadataStore;
pub use postgres::PgMetadataStore;
pub use record::{NewObjectRecord, ObjectRecord};
use uuid::Uuid;

/// Tracing target for store operations.
pub(crate) const TRACING_TARGET: &str = "exhibit_server::service::store";

/// Durable storage for object metadata.
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    /// Persists a new record and returns it with its assigned id and timestamps.
    async fn create(&self, new_record: NewObjectRecord) -> StoreResult<ObjectRecord>;

    /// Returns every record, newest first.
    async fn list(&self) -> StoreResult<Vec<ObjectRecord>>;

    /// Returns the record with the given id, if any.
    async fn get(&self, id: Uuid) -> StoreResult<Option<ObjectRecord>>;

    /// Removes the record with the given id.
    ///
    /// Returns `true` if a record was removed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}
