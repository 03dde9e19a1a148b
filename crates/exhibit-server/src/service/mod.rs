//! Application state and dependency injection.

mod config;
mod fanout;
mod origins;
mod registry;
mod store;

use std::sync::Arc;

pub use crate::service::config::ServiceConfig;
pub use crate::service::fanout::{
    ChannelCommand, ChannelEvent, DeliveryError, OBJECTS_CHANNEL, ObjectBroadcaster,
    ObjectCreatedPayload,
};
pub use crate::service::origins::AllowedOrigins;
pub use crate::service::registry::{
    CreateObjectRequest, DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_MAX_IMAGE_BYTES,
    DESCRIPTION_MAX_CHARS, FieldViolation, ImageUpload, ObjectRegistry, RegistryError,
    RegistryResult, TITLE_MAX_CHARS, UploadPolicy, UploadPolicyBuilder, UploadPolicyError,
    ValidationFailure,
};
pub use crate::service::store::{
    BlobStore, MemoryMetadataStore, MetadataStore, NewObjectRecord, ObjectRecord,
    PgMetadataStore, StoreError, StoreResult,
};
// Re-export error types from crate root for convenience
pub use crate::{Error as ServiceError, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub registry: ObjectRegistry,
    pub broadcaster: ObjectBroadcaster,
    pub origins: AllowedOrigins,
}

impl ServiceState {
    /// Wires the state from already-built parts.
    ///
    /// The broadcaster handed to the registry and the one kept here are the
    /// same handle, so websocket connections see every published event.
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        policy: UploadPolicy,
    ) -> Self {
        let broadcaster = ObjectBroadcaster::new();
        let registry = ObjectRegistry::new(metadata, blobs, broadcaster.clone(), policy);

        Self {
            registry,
            broadcaster,
            origins: AllowedOrigins::default(),
        }
    }

    /// Initializes application state from configuration.
    ///
    /// Connects to PostgreSQL (running pending migrations) and builds the
    /// image storage backend.
    pub async fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        let policy = service_config.upload_policy()?;
        let postgres = service_config.connect_postgres().await?;
        let storage = service_config.connect_storage()?;

        Ok(Self::new(
            Arc::new(PgMetadataStore::new(postgres)),
            Arc::new(storage),
            policy,
        ))
    }

    /// Restricts websocket upgrades to the given origins.
    pub fn with_allowed_origins(mut self, origins: AllowedOrigins) -> Self {
        self.origins = origins;
        self
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(registry: ObjectRegistry);
impl_di!(broadcaster: ObjectBroadcaster);
impl_di!(origins: AllowedOrigins);
