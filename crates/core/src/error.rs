//! Unified error types for form intake.
//!
//! Error taxonomy:
//! - Structural: malformed or oversized submission (400, single global message)
//! - Field validation: one message per offending field (400)
//! - Throttled: too many submissions from one client (429, retry-after)
//! - Processing: persistence/notification failure (500, detail logged only)

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use crate::messages::with_count;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Structural error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureErrorCode {
    /// Form data was not a JSON object
    InvalidFormData,
    /// Form data had no fields
    EmptyFormData,
    /// Field count above the configured maximum
    TooManyFields,
}

impl StructureErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormData => "invalid_form_data",
            Self::EmptyFormData => "empty_form_data",
            Self::TooManyFields => "too_many_fields",
        }
    }
}

/// Per-field error messages, in submission order.
///
/// Serializes as a JSON object `{ fieldId: message }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field. A later error for the same field replaces the earlier one.
    pub fn insert(&mut self, field_id: impl Into<String>, message: impl Into<String>) {
        let field_id = field_id.into();
        let message = message.into();
        match self.0.iter_mut().find(|(id, _)| *id == field_id) {
            Some(entry) => entry.1 = message,
            None => self.0.push((field_id, message)),
        }
    }

    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(id, _)| id == field_id)
            .map(|(_, msg)| msg.as_str())
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.get(field_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, msg)| (id.as_str(), msg.as_str()))
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, msg) in &self.0 {
            map.serialize_entry(id, msg)?;
        }
        map.end()
    }
}

/// Outcome of a failed submission validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The submission as a whole is malformed; no field checks were run.
    #[error("[{code}] {message}")]
    Structure { code: &'static str, message: String },

    /// One or more fields failed their rules.
    #[error("form validation failed for {} field(s)", .errors.len())]
    Fields { message: String, errors: FieldErrors },

    /// A custom submission check vetoed an otherwise valid submission.
    #[error("[custom_validation_failed] {message}")]
    Rejected { message: String },
}

impl ValidationError {
    pub fn structure(code: StructureErrorCode, message: impl Into<String>) -> Self {
        Self::Structure {
            code: code.code(),
            message: message.into(),
        }
    }

    pub fn fields(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self::Fields {
            message: message.into(),
            errors,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Field-level errors, if this is a field validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Fields { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Structure { code, .. } => code,
            Self::Fields { .. } => "validation_failed",
            Self::Rejected { .. } => "custom_validation_failed",
        }
    }
}

/// Unified error type for form intake.
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// `message` is the client-facing notice.
    #[error("throttled: retry after {retry_after}s")]
    Throttled {
        message: String,
        retry_after: u64,
        minutes: u64,
    },

    /// `message` and `error` are client-safe; the cause is logged, never carried.
    #[error("processing error: {message}")]
    Processing { message: String, error: String },

    #[error("store error: {0}")]
    Store(String),

    #[error("notification error: {0}")]
    Notification(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a throttled error, rounding the wait up to whole minutes.
    /// `template` takes the minutes in its `%d` placeholder.
    pub fn throttled(template: &str, retry_after: u64) -> Self {
        let minutes = retry_after.div_ceil(60);
        Self::Throttled {
            message: with_count(template, minutes),
            retry_after,
            minutes,
        }
    }

    pub fn processing(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Processing {
            message: message.into(),
            error: error.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Throttled { .. } => 429,
            Self::Processing { .. } => 500,
            Self::Store(_) => 500,
            Self::Notification(_) => 500,
            Self::Config(_) => 500,
            Self::Serialization(_) => 400,
            Self::Io(_) => 500,
        }
    }

    /// Get the machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::Throttled { .. } => "throttled",
            Self::Serialization(_) => "invalid_json",
            _ => "processing_failed",
        }
    }
}
