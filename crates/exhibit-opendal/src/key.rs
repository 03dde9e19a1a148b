//! Storage key generation.

use std::path::Path;

use derive_more::Display;
use jiff::Timestamp;
use uuid::Uuid;

/// Directory every object image is stored under.
const KEY_PREFIX: &str = "objects";

/// Upper bound of the random key component.
const RANDOM_SPACE: u128 = 1_000_000_000;

/// Longest file name extension carried over into a key.
const MAX_EXTENSION_LEN: usize = 8;

/// A storage key of the form `objects/<unix-millis>-<random>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Generates a fresh key with the given extension.
    pub fn generate(extension: &str) -> Self {
        let millis = Timestamp::now().as_millisecond();
        let random = Uuid::new_v4().as_u128() % RANDOM_SPACE;
        Self(format!("{KEY_PREFIX}/{millis}-{random}.{extension}"))
    }

    /// Generates a key for an upload.
    ///
    /// The extension comes from the file name when it has a usable one,
    /// otherwise from the content type.
    pub fn for_upload(file_name: Option<&str>, content_type: &str) -> Self {
        let extension = file_name
            .and_then(file_extension)
            .unwrap_or_else(|| extension_for_content_type(content_type).to_owned());
        Self::generate(&extension)
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the owned string.
    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn file_extension(file_name: &str) -> Option<String> {
    let extension = Path::new(file_name).extension()?.to_str()?;
    let valid = !extension.is_empty()
        && extension.len() <= MAX_EXTENSION_LEN
        && extension.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| extension.to_ascii_lowercase())
}

fn extension_for_content_type(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_shape() {
        let key = ObjectKey::generate("png");
        let rest = key.as_str().strip_prefix("objects/").unwrap();
        let (stem, extension) = rest.rsplit_once('.').unwrap();
        let (millis, random) = stem.split_once('-').unwrap();

        assert_eq!(extension, "png");
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert!(random.parse::<u64>().unwrap() < 1_000_000_000);
    }

    #[test]
    fn extension_from_file_name() {
        let key = ObjectKey::for_upload(Some("Chair.JPEG"), "image/jpeg");
        assert!(key.as_str().ends_with(".jpeg"));
    }

    #[test]
    fn extension_from_content_type() {
        assert!(ObjectKey::for_upload(None, "image/png").as_str().ends_with(".png"));
        assert!(ObjectKey::for_upload(Some("noext"), "image/jpg").as_str().ends_with(".jpg"));
        assert!(ObjectKey::for_upload(Some("evil.p/ng"), "image/gif").as_str().ends_with(".gif"));
    }

    #[test]
    fn keys_are_distinct() {
        assert_ne!(ObjectKey::generate("gif"), ObjectKey::generate("gif"));
    }
}
