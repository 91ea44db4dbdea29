//! Core types, field rules, validation and sanitization for form intake.

pub mod config;
pub mod error;
pub mod field_config;
pub mod field_type;
pub mod form_validator;
pub mod ip;
pub mod limits;
pub mod messages;
pub mod pattern;
pub mod sanitize;
pub mod submission;

pub use config::*;
pub use error::{Error, FieldErrors, Result, StructureErrorCode, ValidationError};
pub use field_config::*;
pub use field_type::FieldTypeValidator;
pub use form_validator::{FormValidator, SubmissionCheck};
pub use messages::Messages;
pub use pattern::PatternValidator;
pub use sanitize::Sanitizer;
pub use submission::*;
