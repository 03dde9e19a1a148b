//! Multipart form for object creation.

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;

use crate::extract::Multipart;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{CreateObjectRequest, ImageUpload};

/// Content type assumed for an image part that does not declare one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Fields accepted by `POST /objects`.
#[derive(Debug, Default)]
pub struct CreateObjectForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<ImageUpload>,
}

impl CreateObjectForm {
    /// Reads every part of the body, rejecting fields outside the whitelist.
    pub async fn from_multipart(Multipart(mut multipart): Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "title" => form.title = Some(field.text().await.map_err(multipart_error)?),
                "description" => {
                    form.description = Some(field.text().await.map_err(multipart_error)?);
                }
                "image" => form.image = Some(read_image(field).await?),
                other => {
                    return Err(ErrorKind::BadRequest
                        .with_message(format!("Unexpected field '{other}'"))
                        .with_resource("object"));
                }
            }
        }

        Ok(form)
    }

    /// Converts the form into a registry request.
    ///
    /// Missing text fields become empty strings so they are reported by
    /// validation together with any other problem.
    pub fn into_request(self) -> CreateObjectRequest {
        CreateObjectRequest {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            image: self.image,
        }
    }
}

async fn read_image(field: Field<'_>) -> Result<ImageUpload> {
    let content_type = field
        .content_type()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_owned();
    let file_name = field
        .file_name()
        .filter(|name| !name.is_empty())
        .map(str::to_owned);
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok(ImageUpload {
        bytes,
        content_type,
        file_name,
    })
}

fn multipart_error(error: MultipartError) -> Error<'static> {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ErrorKind::PayloadTooLarge
            .with_message("Image is too large")
            .with_resource("object");
    }

    ErrorKind::BadRequest
        .with_message("Invalid multipart data")
        .with_context(error.body_text())
}
