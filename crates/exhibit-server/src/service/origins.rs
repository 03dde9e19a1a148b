use std::sync::Arc;

/// Browser origins permitted to open the realtime websocket.
///
/// An empty list permits any origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOrigins(Arc<[String]>);

impl AllowedOrigins {
    /// Creates the list, dropping blank entries and trailing slashes.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins: Vec<String> = origins
            .into_iter()
            .map(|origin| origin.as_ref().trim().trim_end_matches('/').to_owned())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self(origins.into())
    }

    /// Returns `true` if a request carrying this `Origin` may connect.
    pub fn allows(&self, origin: &str) -> bool {
        self.0.is_empty()
            || self
                .0
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(origin.trim_end_matches('/')))
    }

    /// Returns the configured origins.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_allows_everything() {
        let origins = AllowedOrigins::default();
        assert!(origins.allows("https://anywhere.example"));
    }

    #[test]
    fn listed_origins_only() {
        let origins = AllowedOrigins::new(["http://localhost:3000/", " ", "https://app.example"]);
        assert_eq!(origins.as_slice().len(), 2);
        assert!(origins.allows("http://localhost:3000"));
        assert!(origins.allows("https://APP.example"));
        assert!(!origins.allows("http://localhost:3001"));
        assert!(!origins.allows("null"));
    }
}
