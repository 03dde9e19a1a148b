use bytes::Bytes;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::{FieldViolation, ValidationFailure};

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: u64 = 100;

/// Maximum description length, in characters.
pub const DESCRIPTION_MAX_CHARS: u64 = 500;

/// An uploaded image as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Raw image bytes.
    pub bytes: Bytes,
    /// Declared content type, e.g. `image/png`.
    pub content_type: String,
    /// Client-side file name, used only to pick a key extension.
    pub file_name: Option<String>,
}

/// A request to create an object.
///
/// Text is taken as-is; nothing is trimmed before the length checks.
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateObjectRequest {
    #[validate(length(min = 1, max = TITLE_MAX_CHARS))]
    pub title: String,
    #[validate(length(min = 1, max = DESCRIPTION_MAX_CHARS))]
    pub description: String,
    pub image: Option<ImageUpload>,
}

impl CreateObjectRequest {
    /// Creates a request with an image attached.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        image: ImageUpload,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image: Some(image),
        }
    }

    /// Checks the title and description lengths.
    pub(crate) fn check_text(&self) -> Result<(), ValidationFailure> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(errors) => Err(self.describe_text_errors(&errors)),
        }
    }

    fn describe_text_errors(&self, errors: &ValidationErrors) -> ValidationFailure {
        let mut violations = Vec::new();

        // Report in declaration order rather than map order.
        for (field, label, value, max) in [
            ("title", "Title", &self.title, TITLE_MAX_CHARS),
            ("description", "Description", &self.description, DESCRIPTION_MAX_CHARS),
        ] {
            if !matches!(errors.errors().get(field), Some(ValidationErrorsKind::Field(_))) {
                continue;
            }

            let message = if value.is_empty() {
                format!("{label} is required")
            } else {
                format!("{label} must be at most {max} characters")
            };

            violations.push(FieldViolation::new(field, message));
        }

        ValidationFailure::new(violations)
    }
}
