use exhibit_opendal::StorageError;
use exhibit_postgres::PgError;

use crate::BoxedError;

/// Result type for store operations.
pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;

/// Failure of the metadata store or the blob store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The metadata store rejected or failed the operation.
    #[error("metadata store: {0}")]
    Metadata(#[source] BoxedError),
    /// The blob store rejected or failed the operation.
    #[error("blob store: {0}")]
    Blob(#[source] BoxedError),
}

impl StoreError {
    /// Wraps any error as a metadata store failure.
    pub fn metadata(error: impl Into<BoxedError>) -> Self {
        Self::Metadata(error.into())
    }

    /// Wraps any error as a blob store failure.
    pub fn blob(error: impl Into<BoxedError>) -> Self {
        Self::Blob(error.into())
    }
}

impl From<PgError> for StoreError {
    fn from(error: PgError) -> Self {
        Self::metadata(error)
    }
}

impl From<StorageError> for StoreError {
    fn from(error: StorageError) -> Self {
        Self::blob(error)
    }
}
