//! Object repository for managing object rows.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewObject, Object};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for object database operations.
pub trait ObjectRepository {
    /// Inserts a new object and returns the stored row.
    fn create_object(
        &mut self,
        new_object: NewObject,
    ) -> impl Future<Output = PgResult<Object>> + Send;

    /// Lists every object, newest first.
    fn list_objects(&mut self) -> impl Future<Output = PgResult<Vec<Object>>> + Send;

    /// Finds an object by ID.
    fn find_object_by_id(
        &mut self,
        object_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Object>>> + Send;

    /// Deletes an object by ID.
    ///
    /// Returns `true` if a row was removed.
    fn delete_object(&mut self, object_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;
}

impl ObjectRepository for PgConnection {
    async fn create_object(&mut self, new_object: NewObject) -> PgResult<Object> {
        use schema::objects;

        let object = diesel::insert_into(objects::table)
            .values(&new_object)
            .returning(Object::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(target: TRACING_TARGET_QUERY, object_id = %object.id, "Object inserted");
        Ok(object)
    }

    async fn list_objects(&mut self) -> PgResult<Vec<Object>> {
        use schema::objects::dsl::*;

        let rows = objects
            .order((created_at.desc(), id.desc()))
            .select(Object::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(rows)
    }

    async fn find_object_by_id(&mut self, object_id: Uuid) -> PgResult<Option<Object>> {
        use schema::objects::dsl::*;

        let object = objects
            .filter(id.eq(object_id))
            .select(Object::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(object)
    }

    async fn delete_object(&mut self, object_id: Uuid) -> PgResult<bool> {
        use schema::objects::dsl::*;

        let affected = diesel::delete(objects.filter(id.eq(object_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(target: TRACING_TARGET_QUERY, object_id = %object_id, affected, "Object delete executed");
        Ok(affected > 0)
    }
}
