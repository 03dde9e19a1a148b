use jiff::Timestamp;
use uuid::Uuid;

/// A stored object as seen by the service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    /// Storage key of the image, kept so the blob can be located later.
    pub image_key: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields supplied when persisting a new object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewObjectRecord {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub image_key: String,
    pub content_type: String,
    pub size_bytes: u64,
}
