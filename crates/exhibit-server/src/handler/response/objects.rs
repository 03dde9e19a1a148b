//! Object response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::ObjectRecord;

/// Represents a stored object in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    /// Unique object identifier.
    pub id: Uuid,
    /// Object title.
    pub title: String,
    /// Object description.
    pub description: String,
    /// Retrievable URL of the object's image.
    pub image_url: String,
    /// Timestamp when the object was created.
    pub created_at: Timestamp,
    /// Timestamp when the object was last updated.
    pub updated_at: Timestamp,
}

/// Response for listing objects, newest first.
pub type Objects = Vec<Object>;

impl From<ObjectRecord> for Object {
    fn from(record: ObjectRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            image_url: record.image_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
