//! Object CRUD handlers.

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::get;
use uuid::Uuid;

use crate::extract::{Json, Multipart, Path};
use crate::handler::request::CreateObjectForm;
use crate::handler::response::{Object, Objects};
use crate::handler::{ErrorKind, Result};
use crate::service::{ObjectRegistry, ServiceState};

/// Tracing target for object operations.
const TRACING_TARGET: &str = "exhibit_server::handler::objects";

/// Room left in the request body for multipart framing and text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Creates an object from a multipart upload.
#[tracing::instrument(skip_all)]
async fn create_object(
    State(registry): State<ObjectRegistry>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Object>)> {
    tracing::debug!(target: TRACING_TARGET, "Creating object");

    let form = CreateObjectForm::from_multipart(multipart).await?;
    let record = registry.create(form.into_request()).await?;

    tracing::info!(
        target: TRACING_TARGET,
        object_id = %record.id,
        "Object created",
    );

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Lists all objects, newest first.
#[tracing::instrument(skip_all)]
async fn list_objects(State(registry): State<ObjectRegistry>) -> Result<Json<Objects>> {
    let records = registry.list().await?;

    tracing::debug!(
        target: TRACING_TARGET,
        object_count = records.len(),
        "Objects listed",
    );

    Ok(Json(records.into_iter().map(Object::from).collect()))
}

/// Returns a single object.
#[tracing::instrument(skip_all)]
async fn read_object(
    State(registry): State<ObjectRegistry>,
    Path(id): Path<String>,
) -> Result<Json<Object>> {
    let id = parse_object_id(&id)?;
    let record = registry.get(id).await?;

    tracing::debug!(target: TRACING_TARGET, object_id = %id, "Object read");
    Ok(Json(record.into()))
}

/// Deletes an object's metadata. The stored image is kept.
#[tracing::instrument(skip_all)]
async fn delete_object(
    State(registry): State<ObjectRegistry>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_object_id(&id)?;
    registry.delete(id).await?;

    tracing::info!(target: TRACING_TARGET, object_id = %id, "Object deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// A string that is not a UUID cannot name any object.
fn parse_object_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        ErrorKind::NotFound
            .with_message("Object not found")
            .with_resource("object")
    })
}

/// Returns a [`Router`] with all object routes.
///
/// The body limit follows the registry's image limit, leaving room for the
/// multipart framing so an image exactly at the limit reaches validation.
pub fn routes(state: &ServiceState) -> Router<ServiceState> {
    let max_image_bytes = usize::try_from(state.registry.policy().max_image_bytes)
        .unwrap_or(usize::MAX);
    let body_limit = max_image_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/objects", get(list_objects).post(create_object))
        .route("/objects/{id}", get(read_object).delete(delete_object))
        .layer(DefaultBodyLimit::max(body_limit))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::Value;

    use crate::handler::response::Object;
    use crate::handler::test::create_test_server;
    use crate::service::DEFAULT_MAX_IMAGE_BYTES;

    fn png_part(len: usize) -> Part {
        Part::bytes(vec![0x89; len])
            .file_name("photo.png")
            .mime_type("image/png")
    }

    fn object_form(title: &str, description: &str, image: Part) -> MultipartForm {
        MultipartForm::new()
            .add_text("title", title.to_owned())
            .add_text("description", description.to_owned())
            .add_part("image", image)
    }

    #[tokio::test]
    async fn create_then_read_list_and_delete() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server
            .post("/objects")
            .multipart(object_form("Vase", "Blue glaze", png_part(32)))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Object = response.json();
        assert_eq!(created.title, "Vase");
        assert_eq!(created.description, "Blue glaze");
        assert!(created.image_url.starts_with("memory://exhibit/objects/"));
        assert!(created.image_url.ends_with(".png"));

        let raw: Value = response.json();
        for key in ["id", "title", "description", "imageUrl", "createdAt", "updatedAt"] {
            assert!(raw.get(key).is_some(), "missing {key}");
        }

        let fetched: Object = server.get(&format!("/objects/{}", created.id)).await.json();
        assert_eq!(fetched.id, created.id);

        let listed: Vec<Object> = server.get("/objects").await.json();
        assert_eq!(listed.len(), 1);

        server
            .delete(&format!("/objects/{}", created.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/objects/{}", created.id))
            .await
            .assert_status_not_found();
        server
            .delete(&format!("/objects/{}", created.id))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[tokio::test]
    async fn list_is_newest_first() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        for title in ["first", "second", "third"] {
            server
                .post("/objects")
                .multipart(object_form(title, "d", png_part(4)))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let titles: Vec<String> = server
            .get("/objects")
            .await
            .json::<Vec<Object>>()
            .into_iter()
            .map(|object| object.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_image_is_rejected() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let form = MultipartForm::new()
            .add_text("title", "Vase")
            .add_text("description", "Blue glaze");
        let response = server.post("/objects").multipart(form).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("Image is required"));
        assert!(server.get("/objects").await.json::<Vec<Value>>().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_field_is_rejected() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let form = object_form("Vase", "Blue", png_part(4)).add_text("owner", "mallory");
        let response = server.post("/objects").multipart(form).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("owner"));
        Ok(())
    }

    #[tokio::test]
    async fn text_limits_are_enforced() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        server
            .post("/objects")
            .multipart(object_form(&"t".repeat(100), &"d".repeat(500), png_part(4)))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/objects")
            .multipart(object_form(&"t".repeat(101), "d", png_part(4)))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("Title must be at most 100"));

        server
            .post("/objects")
            .multipart(object_form("", "d", png_part(4)))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    #[tokio::test]
    async fn unsupported_image_type_is_rejected() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let image = Part::bytes(b"%PDF-1.7".to_vec())
            .file_name("doc.pdf")
            .mime_type("application/pdf");
        let response = server
            .post("/objects")
            .multipart(object_form("Doc", "Not an image", image))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("Invalid image format"));
        Ok(())
    }

    #[tokio::test]
    async fn image_size_boundary() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        let limit = DEFAULT_MAX_IMAGE_BYTES as usize;

        server
            .post("/objects")
            .multipart(object_form("Exact", "At the limit", png_part(limit)))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/objects")
            .multipart(object_form("Over", "One byte more", png_part(limit + 1)))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    #[tokio::test]
    async fn oversized_body_is_payload_too_large() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        let huge = DEFAULT_MAX_IMAGE_BYTES as usize * 2;

        let response = server
            .post("/objects")
            .multipart(object_form("Huge", "Way over", png_part(huge)))
            .await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        Ok(())
    }

    #[tokio::test]
    async fn non_uuid_id_is_not_found() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        server.get("/objects/not-a-uuid").await.assert_status_not_found();
        server.delete("/objects/42").await.assert_status_not_found();
        Ok(())
    }
}
