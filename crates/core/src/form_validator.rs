//! Submission validation.
//!
//! Validation runs in two stages. The structure check looks at the
//! submission as a whole and stops at the first problem. The field check then
//! runs every field through the same chain (identifier, value shape, required,
//! length, pattern, type) and collects one error per failing field. A field
//! stops at its first failing rule; other fields are still checked.

use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::config::ValidationConfig;
use crate::error::{FieldErrors, StructureErrorCode, ValidationError};
use crate::field_config::{FieldConfig, FieldConfigResolver, HeuristicResolver};
use crate::field_type::FieldTypeValidator;
use crate::limits::FIELD_ID_PATTERN;
use crate::messages::{with_count, Messages};
use crate::pattern::PatternValidator;
use crate::submission::Submission;

static FIELD_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FIELD_ID_PATTERN).expect("invalid field id pattern"));

/// Host-supplied check that can veto a submission that passed field validation.
pub trait SubmissionCheck: Send + Sync {
    /// Return `Err(message)` to reject the submission.
    fn check(&self, submission: &Submission) -> Result<(), String>;
}

impl<F> SubmissionCheck for F
where
    F: Fn(&Submission) -> Result<(), String> + Send + Sync,
{
    fn check(&self, submission: &Submission) -> Result<(), String> {
        self(submission)
    }
}

/// Validates complete form submissions.
#[derive(Clone)]
pub struct FormValidator {
    max_fields: usize,
    max_field_length: usize,
    max_field_id_length: usize,
    messages: Arc<Messages>,
    resolver: Arc<dyn FieldConfigResolver>,
    pattern_validator: PatternValidator,
    type_validator: FieldTypeValidator,
    checks: Vec<Arc<dyn SubmissionCheck>>,
}

impl FormValidator {
    /// Creates a validator with the keyword-based field resolver.
    pub fn new(config: ValidationConfig) -> Self {
        let resolver = Arc::new(HeuristicResolver::new(&config.fields));
        Self::with_resolver(config, resolver)
    }

    /// Creates a validator with a custom field resolver.
    pub fn with_resolver(config: ValidationConfig, resolver: Arc<dyn FieldConfigResolver>) -> Self {
        let messages = Arc::new(config.messages);

        Self {
            max_fields: config.max_fields,
            max_field_length: config.max_field_length,
            max_field_id_length: config.max_field_id_length,
            pattern_validator: PatternValidator::new(config.max_pattern_length, messages.clone()),
            type_validator: FieldTypeValidator::new(config.types, messages.clone()),
            messages,
            resolver,
            checks: Vec::new(),
        }
    }

    /// Add a submission-level check that runs after all fields pass.
    pub fn with_check(mut self, check: impl SubmissionCheck + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    /// The field resolver in use.
    pub fn resolver(&self) -> &Arc<dyn FieldConfigResolver> {
        &self.resolver
    }

    pub fn messages(&self) -> &Arc<Messages> {
        &self.messages
    }

    /// Validate decoded `form_data` JSON.
    pub fn validate_json(&self, form_data: &Value) -> Result<Submission, ValidationError> {
        let submission = Submission::from_json(form_data).ok_or_else(|| {
            ValidationError::structure(
                StructureErrorCode::InvalidFormData,
                self.messages.invalid_form_data.clone(),
            )
        })?;

        self.validate_submission(&submission)?;
        Ok(submission)
    }

    /// Validate a submission.
    pub fn validate_submission(&self, submission: &Submission) -> Result<(), ValidationError> {
        self.validate_structure(submission)?;

        let errors = self.validate_fields(submission);
        if !errors.is_empty() {
            debug!(
                field_count = submission.len(),
                error_count = errors.len(),
                "Submission failed field validation"
            );
            return Err(ValidationError::fields(
                self.messages.validation_failed.clone(),
                errors,
            ));
        }

        for check in &self.checks {
            check.check(submission).map_err(ValidationError::rejected)?;
        }

        Ok(())
    }

    fn validate_structure(&self, submission: &Submission) -> Result<(), ValidationError> {
        if submission.is_empty() {
            return Err(ValidationError::structure(
                StructureErrorCode::EmptyFormData,
                self.messages.empty_form_data.clone(),
            ));
        }

        if submission.len() > self.max_fields {
            return Err(ValidationError::structure(
                StructureErrorCode::TooManyFields,
                with_count(&self.messages.too_many_fields, self.max_fields),
            ));
        }

        Ok(())
    }

    fn validate_fields(&self, submission: &Submission) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for (field_id, value) in submission.iter() {
            if !self.is_valid_field_id(field_id) {
                errors.insert(field_id, self.messages.invalid_field_id.clone());
                continue;
            }

            if let Some(message) = self.validate_field(field_id, value) {
                errors.insert(field_id, message);
            }
        }

        errors
    }

    fn is_valid_field_id(&self, field_id: &str) -> bool {
        !field_id.is_empty()
            && field_id.chars().count() <= self.max_field_id_length
            && FIELD_ID_REGEX.is_match(field_id)
    }

    fn validate_field(&self, field_id: &str, value: &Value) -> Option<String> {
        let Some(value) = value.as_str() else {
            return Some(self.messages.value_not_text.clone());
        };

        if value.chars().count() > self.max_field_length {
            return Some(with_count(&self.messages.value_too_long, self.max_field_length));
        }

        let config = self.resolver.resolve(field_id);
        self.validate_rules(value, &config)
    }

    fn validate_rules(&self, value: &str, config: &FieldConfig) -> Option<String> {
        let value = value.trim();

        if value.is_empty() {
            return config.required.then(|| self.messages.required.clone());
        }

        self.validate_length(value, config)
            .or_else(|| self.pattern_validator.validate(value, config))
            .or_else(|| self.type_validator.validate(value, config))
    }

    fn validate_length(&self, value: &str, config: &FieldConfig) -> Option<String> {
        let length = value.chars().count();

        if let Some(min) = config.min_length {
            if length < min {
                return Some(with_count(&self.messages.min_length, min));
            }
        }

        if let Some(max) = config.max_length {
            if length > max {
                return Some(with_count(&self.messages.max_length, max));
            }
        }

        None
    }
}
