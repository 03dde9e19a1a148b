use derive_builder::Builder;

/// Default maximum image size: 5 MiB.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Content types accepted by default.
pub const DEFAULT_ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Limits applied to uploaded images.
///
/// ```rust
/// use exhibit_server::service::UploadPolicy;
///
/// let policy = UploadPolicy::builder()
///     .with_max_image_bytes(1024u64)
///     .build()?;
/// assert!(policy.allows_content_type("image/png"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(
    name = "UploadPolicyBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate", error = "UploadPolicyError")
)]
pub struct UploadPolicy {
    /// Largest accepted image, in bytes (inclusive).
    #[builder(default = "DEFAULT_MAX_IMAGE_BYTES")]
    pub max_image_bytes: u64,
    /// Accepted image content types.
    #[builder(default = "default_content_types()")]
    pub allowed_content_types: Vec<String>,
}

/// Error type for [`UploadPolicyBuilder`].
#[derive(Debug, thiserror::Error)]
pub enum UploadPolicyError {
    #[error("missing field: {0}")]
    Uninitialized(#[from] derive_builder::UninitializedFieldError),
    #[error("invalid upload policy: {0}")]
    Invalid(String),
}

impl From<String> for UploadPolicyError {
    fn from(message: String) -> Self {
        Self::Invalid(message)
    }
}

fn default_content_types() -> Vec<String> {
    DEFAULT_ALLOWED_CONTENT_TYPES
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

impl UploadPolicyBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_image_bytes == Some(0) {
            return Err("max_image_bytes must be greater than zero".into());
        }
        if self
            .allowed_content_types
            .as_ref()
            .is_some_and(|types| types.is_empty())
        {
            return Err("allowed_content_types must not be empty".into());
        }
        Ok(())
    }
}

impl UploadPolicy {
    /// Returns a builder with the default limits.
    pub fn builder() -> UploadPolicyBuilder {
        UploadPolicyBuilder::default()
    }

    /// Returns `true` if `content_type` is accepted.
    pub fn allows_content_type(&self, content_type: &str) -> bool {
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }

    /// Returns `true` if an image of `size` bytes is accepted.
    pub fn allows_size(&self, size: u64) -> bool {
        size <= self.max_image_bytes
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            allowed_content_types: default_content_types(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_default() {
        let policy = UploadPolicy::builder().build().unwrap();
        assert_eq!(policy, UploadPolicy::default());
        assert_eq!(policy.max_image_bytes, 5_242_880);
    }

    #[test]
    fn size_limit_is_inclusive() {
        let policy = UploadPolicy::default();
        assert!(policy.allows_size(DEFAULT_MAX_IMAGE_BYTES));
        assert!(!policy.allows_size(DEFAULT_MAX_IMAGE_BYTES + 1));
    }

    #[test]
    fn content_types() {
        let policy = UploadPolicy::default();
        for allowed in DEFAULT_ALLOWED_CONTENT_TYPES {
            assert!(policy.allows_content_type(allowed));
        }
        assert!(policy.allows_content_type("IMAGE/PNG"));
        assert!(!policy.allows_content_type("image/webp"));
        assert!(!policy.allows_content_type("application/pdf"));
    }

    #[test]
    fn builder_rejects_invalid_limits() {
        assert!(UploadPolicy::builder().with_max_image_bytes(0u64).build().is_err());
        assert!(
            UploadPolicy::builder()
                .with_allowed_content_types(Vec::<String>::new())
                .build()
                .is_err()
        );
    }
}
