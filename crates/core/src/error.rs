//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic domain failures: bad input and missing
/// resources. Transport concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A single input field failed validation.
    #[error("validation failed on '{field}': {message}")]
    Validation { field: String, message: String },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Name of the offending field, for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_carries_field_detail() {
        let err = DomainError::validation("role", "unknown role 'Owner'");
        assert_eq!(err.field(), Some("role"));
        assert_eq!(
            err.to_string(),
            "validation failed on 'role': unknown role 'Owner'"
        );
    }

    #[test]
    fn non_validation_errors_have_no_field() {
        assert_eq!(DomainError::NotFound.field(), None);
        assert_eq!(DomainError::invalid_id("UserId: empty").field(), None);
    }
}
