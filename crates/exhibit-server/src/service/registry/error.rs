use std::borrow::Cow;
use std::fmt;

use uuid::Uuid;

use crate::service::StoreError;

/// Result type for registry operations.
pub type RegistryResult<T, E = RegistryError> = std::result::Result<T, E>;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: Cow<'static, str>,
    pub message: Cow<'static, str>,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Input failed validation; carries one violation per failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    violations: Vec<FieldViolation>,
}

impl ValidationFailure {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Shorthand for a failure with a single violation.
    pub fn single(
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(vec![FieldViolation::new(field, message)])
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut messages = self.violations.iter().map(|v| v.message.as_ref());
        if let Some(first) = messages.next() {
            f.write_str(first)?;
        }
        for message in messages {
            write!(f, "; {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Errors returned by [`ObjectRegistry`](super::ObjectRegistry).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The request was rejected before anything was stored.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),
    /// No object exists with the given id.
    #[error("object {0} not found")]
    NotFound(Uuid),
    /// The metadata or blob store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}
