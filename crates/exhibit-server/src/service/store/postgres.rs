use exhibit_postgres::PgClient;
use exhibit_postgres::model::{NewObject, Object};
use exhibit_postgres::query::ObjectRepository;
use uuid::Uuid;

use super::{MetadataStore, NewObjectRecord, ObjectRecord, StoreError, StoreResult};

/// [`MetadataStore`] backed by the PostgreSQL `objects` table.
#[derive(Debug, Clone)]
pub struct PgMetadataStore {
    client: PgClient,
}

impl PgMetadataStore {
    /// Creates a store over an existing connection pool.
    pub fn new(client: PgClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &PgClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl MetadataStore for PgMetadataStore {
    async fn create(&self, new_record: NewObjectRecord) -> StoreResult<ObjectRecord> {
        let new_object = NewObject {
            title: new_record.title,
            description: new_record.description,
            image_url: new_record.image_url,
            image_key: new_record.image_key,
            content_type: new_record.content_type,
            size_bytes: i64::try_from(new_record.size_bytes).map_err(StoreError::metadata)?,
        };

        let mut conn = self.client.get_connection().await?;
        let object = conn.create_object(new_object).await?;
        Ok(object.into())
    }

    async fn list(&self) -> StoreResult<Vec<ObjectRecord>> {
        let mut conn = self.client.get_connection().await?;
        let objects = conn.list_objects().await?;
        Ok(objects.into_iter().map(ObjectRecord::from).collect())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<ObjectRecord>> {
        let mut conn = self.client.get_connection().await?;
        let object = conn.find_object_by_id(id).await?;
        Ok(object.map(ObjectRecord::from))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.client.get_connection().await?;
        Ok(conn.delete_object(id).await?)
    }
}

impl From<Object> for ObjectRecord {
    fn from(object: Object) -> Self {
        Self {
            id: object.id,
            title: object.title,
            description: object.description,
            image_url: object.image_url,
            image_key: object.image_key,
            content_type: object.content_type,
            // The column carries a non-negative CHECK constraint.
            size_bytes: u64::try_from(object.size_bytes).unwrap_or_default(),
            created_at: object.created_at.into(),
            updated_at: object.updated_at.into(),
        }
    }
}
