//! Object registry: validates, stores and announces objects.
//!
//! Creation writes the image blob first and the metadata row second, then
//! publishes `object:created`. A failed blob write leaves no row behind; a
//! failed row write triggers a best-effort delete of the blob that was just
//! written. Deletion removes the row and publishes `object:deleted`; the
//! image blob is left in storage.

mod error;
mod policy;
mod request;

use std::sync::Arc;

use exhibit_opendal::ObjectKey;
use uuid::Uuid;

pub use self::error::{FieldViolation, RegistryError, RegistryResult, ValidationFailure};
pub use self::policy::{
    DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_MAX_IMAGE_BYTES, UploadPolicy, UploadPolicyBuilder,
    UploadPolicyError,
};
pub use self::request::{
    CreateObjectRequest, DESCRIPTION_MAX_CHARS, ImageUpload, TITLE_MAX_CHARS,
};
use crate::service::fanout::{ChannelEvent, ObjectBroadcaster};
use crate::service::store::{BlobStore, MetadataStore, NewObjectRecord, ObjectRecord};

/// Tracing target for registry operations.
const TRACING_TARGET: &str = "exhibit_server::service::registry";

/// Object lifecycle service shared by all handlers.
#[derive(Clone)]
pub struct ObjectRegistry {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    broadcaster: ObjectBroadcaster,
    policy: UploadPolicy,
}

impl ObjectRegistry {
    /// Creates a registry over the given stores.
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        broadcaster: ObjectBroadcaster,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            metadata,
            blobs,
            broadcaster,
            policy,
        }
    }

    /// Returns the upload limits in force.
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validates and stores a new object, then announces it.
    pub async fn create(&self, request: CreateObjectRequest) -> RegistryResult<ObjectRecord> {
        let ValidObject {
            title,
            description,
            image,
        } = self.validate(request)?;
        let size_bytes = image.bytes.len() as u64;

        let key = ObjectKey::for_upload(image.file_name.as_deref(), &image.content_type);
        let blob = self
            .blobs
            .put(&key, image.bytes, &image.content_type)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    target: TRACING_TARGET,
                    key = %key,
                    error = %error,
                    "image upload failed"
                );
            })?;

        let new_record = NewObjectRecord {
            title,
            description,
            image_url: blob.url,
            image_key: blob.key,
            content_type: image.content_type,
            size_bytes,
        };

        let record = match self.metadata.create(new_record).await {
            Ok(record) => record,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    key = %key,
                    error = %error,
                    "metadata write failed, removing uploaded image"
                );
                if let Err(cleanup) = self.blobs.delete(key.as_str()).await {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        key = %key,
                        error = %cleanup,
                        "orphaned image could not be removed"
                    );
                }
                return Err(error.into());
            }
        };

        tracing::info!(
            target: TRACING_TARGET,
            object_id = %record.id,
            key = %record.image_key,
            size_bytes = record.size_bytes,
            "object created"
        );

        self.broadcaster
            .publish(ChannelEvent::ObjectCreated((&record).into()))
            .await;

        Ok(record)
    }

    /// Returns every object, newest first.
    pub async fn list(&self) -> RegistryResult<Vec<ObjectRecord>> {
        Ok(self.metadata.list().await?)
    }

    /// Returns the object with the given id.
    pub async fn get(&self, id: Uuid) -> RegistryResult<ObjectRecord> {
        self.metadata
            .get(id)
            .await?
            .ok_or(RegistryError::NotFound(id))
    }

    /// Deletes the object's metadata and announces the deletion.
    ///
    /// The image blob is not removed.
    pub async fn delete(&self, id: Uuid) -> RegistryResult<()> {
        if !self.metadata.delete(id).await? {
            return Err(RegistryError::NotFound(id));
        }

        tracing::info!(target: TRACING_TARGET, object_id = %id, "object deleted");
        self.broadcaster
            .publish(ChannelEvent::ObjectDeleted(id))
            .await;

        Ok(())
    }

    /// Runs every check in order: text fields, then image presence, content
    /// type and size.
    fn validate(&self, request: CreateObjectRequest) -> RegistryResult<ValidObject> {
        let mut violations = match request.check_text() {
            Ok(()) => Vec::new(),
            Err(failure) => failure.violations().to_vec(),
        };

        match &request.image {
            Some(image) if !image.bytes.is_empty() => {
                if !self.policy.allows_content_type(&image.content_type) {
                    violations.push(FieldViolation::new(
                        "image",
                        "Invalid image format. Only PNG, JPG, and GIF are allowed",
                    ));
                } else if !self.policy.allows_size(image.bytes.len() as u64) {
                    violations.push(FieldViolation::new(
                        "image",
                        format!(
                            "Image must be at most {} bytes",
                            self.policy.max_image_bytes
                        ),
                    ));
                }
            }
            _ => violations.push(FieldViolation::new("image", "Image is required")),
        }

        match request.image {
            Some(image) if violations.is_empty() => Ok(ValidObject {
                title: request.title,
                description: request.description,
                image,
            }),
            _ => Err(ValidationFailure::new(violations).into()),
        }
    }
}

struct ValidObject {
    title: String,
    description: String,
    image: ImageUpload,
}

impl std::fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
