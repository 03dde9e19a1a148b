//! Object model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::objects;

/// A persisted object row: user-supplied text plus the location of its image.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = objects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Object {
    /// Unique object identifier, assigned by the database.
    pub id: Uuid,
    /// Short title, 1 to 100 characters.
    pub title: String,
    /// Longer description, 1 to 500 characters.
    pub description: String,
    /// Retrievable URL of the stored image.
    pub image_url: String,
    /// Storage key the image was written under.
    pub image_key: String,
    /// Content type the image was uploaded with.
    pub content_type: String,
    /// Image size in bytes.
    pub size_bytes: i64,
    /// Timestamp when this object was created.
    pub created_at: Timestamp,
    /// Timestamp when this object was last modified.
    pub updated_at: Timestamp,
}

/// Data structure for inserting a new object.
///
/// `id` and both timestamps are filled in by column defaults.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = objects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewObject {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub image_key: String,
    pub content_type: String,
    pub size_bytes: i64,
}
