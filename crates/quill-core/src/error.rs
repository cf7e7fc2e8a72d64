//! Domain-level error types.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::domain::PostId;

/// Longest accepted post body, counted after trimming.
pub const MAX_CONTENT_CHARS: usize = 1000;

/// Draft field a validation error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Content,
    ScheduledTime,
}

impl Field {
    /// Key used by the presentation layer for this field.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Content => "content",
            Field::ScheduledTime => "scheduledTime",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single rule violation in a submitted draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Description is required")]
    RequiredField,

    #[error("Description cannot exceed 1000 characters")]
    TooLong { length: usize },

    #[error("Please select a date and time")]
    MissingField,

    #[error("Please select a valid date and time")]
    InvalidFormat(String),

    #[error("Please select a future date and time")]
    NotInFuture,
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::RequiredField | ValidationError::TooLong { .. } => Field::Content,
            ValidationError::MissingField
            | ValidationError::InvalidFormat(_)
            | ValidationError::NotInFuture => Field::ScheduledTime,
        }
    }
}

/// Every violation found in one draft, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Validation failed for {}", join_fields(.errors))]
pub struct FieldErrors {
    errors: BTreeMap<Field, ValidationError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation. The first error reported for a field wins.
    pub fn push(&mut self, error: ValidationError) {
        self.errors.entry(error.field()).or_insert(error);
    }

    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.values()
    }

    /// User-facing messages keyed by field name.
    pub fn messages(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|(field, error)| (field.key().to_string(), error.to_string()))
            .collect()
    }
}

fn join_fields(errors: &BTreeMap<Field, ValidationError>) -> String {
    errors.keys().map(Field::key).collect::<Vec<_>>().join(", ")
}

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Duplicate post id: {0}")]
    Duplicate(PostId),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Outcome of a rejected submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FieldErrors),

    #[error("Submission failed: {0}")]
    Failed(#[from] DomainError),
}
