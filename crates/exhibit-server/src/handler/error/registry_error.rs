//! Registry error to HTTP error conversion.

use crate::handler::{Error, ErrorKind};
use crate::service::RegistryError;

/// Tracing target for registry error conversion.
const TRACING_TARGET: &str = "exhibit_server::handler::registry_error";

impl From<RegistryError> for Error<'static> {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::Validation(failure) => ErrorKind::BadRequest
                .with_message(failure.to_string())
                .with_resource("object"),
            RegistryError::NotFound(id) => ErrorKind::NotFound
                .with_message("Object not found")
                .with_resource("object")
                .with_context(format!("ID: {id}")),
            RegistryError::Storage(store_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %store_error,
                    "storage failure"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::service::{StoreError, ValidationFailure};

    #[test]
    fn validation_is_bad_request_with_message() {
        let error: Error = RegistryError::from(ValidationFailure::single("image", "Image is required")).into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.message(), Some("Image is required"));
        assert_eq!(error.resource(), Some("object"));
    }

    #[test]
    fn not_found_maps_to_404() {
        let error: Error = RegistryError::NotFound(Uuid::nil()).into();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let error: Error =
            RegistryError::Storage(StoreError::metadata("password authentication failed")).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), None);
        assert_eq!(error.context(), None);
    }
}
