//! Field-scoped errors.

use thiserror::Error;

/// Errors raised while registering fields or translating a single field.
///
/// Every variant names the offending field; a field error aborts the whole
/// lifecycle operation with no partial application.
#[derive(Debug, Error)]
pub enum FieldError {
    /// A configuration entry did not have the shape the field declares.
    #[error("field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A field value was present but unusable.
    #[error("field {field}: {message}")]
    Invalid { field: String, message: String },

    /// Reading a field from the domain object failed.
    #[error("failed to read field {field}: {message}")]
    Read { field: String, message: String },

    /// The same field name was registered twice.
    #[error("duplicate field registration: {field}")]
    Duplicate { field: String },
}

impl FieldError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn read(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }
}
