//! # Registry Errors
//!
//! Every failure a mutating operation can report is one [`RegistryError`]
//! variant carrying a human-readable cause. Collaborator errors
//! ([`StoreError`], [`ExtractError`], listener failures) are converted at the
//! service boundary.

use crate::index::ExtractError;
use crate::store::StoreError;

/// Boxed error type used for causes that cross collaborator boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The result type used throughout the registry.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors reported by [`ResourceService`](crate::service::ResourceService).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Caller input violates a structural invariant (e.g. payload location).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced resource or resource type does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource's declared payload format disagrees with its type.
    #[error("payload format {actual:?} does not match resource type format {expected:?}")]
    FormatMismatch { expected: String, actual: String },

    /// The payload failed schema validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The declared payload format has no registered validator.
    #[error("unsupported payload format: {0}")]
    UnsupportedFormat(String),

    /// Extraction, persistence or a lifecycle listener failed.
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl RegistryError {
    pub fn internal(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        RegistryError::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Short machine-friendly name of the variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::InvalidInput(_) => "invalid_input",
            RegistryError::NotFound(_) => "not_found",
            RegistryError::FormatMismatch { .. } => "format_mismatch",
            RegistryError::Validation(_) => "validation",
            RegistryError::UnsupportedFormat(_) => "unsupported_format",
            RegistryError::Internal { .. } => "internal",
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => RegistryError::NotFound(what),
            other => RegistryError::internal("resource store failure", other),
        }
    }
}

impl From<ExtractError> for RegistryError {
    fn from(e: ExtractError) -> Self {
        RegistryError::internal("field extraction failed", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn internal_keeps_its_cause() {
        let err: RegistryError = StoreError::Backend("disk full".into()).into();
        assert_eq!(err.kind(), "internal");
        let cause = err.source().expect("cause preserved");
        assert!(cause.to_string().contains("disk full"));
    }

    #[test]
    fn store_not_found_stays_not_found() {
        let err: RegistryError = StoreError::NotFound("resource abc".into()).into();
        assert!(matches!(err, RegistryError::NotFound(ref m) if m == "resource abc"));
    }
}
