//! Type-specific field checks.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use url::Url;
use validator::ValidateEmail;

use crate::config::TypeLimits;
use crate::field_config::{FieldConfig, FieldType};
use crate::limits::TEL_PATTERN;
use crate::messages::{with_count, Messages};

static TEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TEL_PATTERN).expect("invalid telephone pattern"));

/// Validates values by field type.
#[derive(Debug, Clone)]
pub struct FieldTypeValidator {
    limits: TypeLimits,
    messages: Arc<Messages>,
}

impl FieldTypeValidator {
    pub fn new(limits: TypeLimits, messages: Arc<Messages>) -> Self {
        Self { limits, messages }
    }

    /// Returns an error message if the value is not acceptable for the field type.
    pub fn validate(&self, value: &str, config: &FieldConfig) -> Option<String> {
        match config.field_type {
            FieldType::Email => self.validate_email(value),
            FieldType::Url => self.validate_url(value),
            FieldType::Tel => self.validate_tel(value),
            FieldType::Textarea => self.validate_textarea(value),
            FieldType::Text => None,
        }
    }

    fn validate_email(&self, value: &str) -> Option<String> {
        // Length first: the address parser also rejects overlong parts.
        if value.chars().count() > self.limits.email_max_length {
            return Some(self.messages.email_too_long.clone());
        }

        if !value.validate_email() {
            return Some(self.messages.invalid_email.clone());
        }

        None
    }

    fn validate_url(&self, value: &str) -> Option<String> {
        let parsed = match Url::parse(value) {
            Ok(url) if url.has_host() => url,
            _ => return Some(self.messages.invalid_url.clone()),
        };

        if value.chars().count() > self.limits.url_max_length {
            return Some(self.messages.url_too_long.clone());
        }

        if !is_allowed_scheme(parsed.scheme(), &self.limits.allowed_url_schemes) {
            return Some(self.messages.url_scheme_not_allowed.clone());
        }

        None
    }

    fn validate_tel(&self, value: &str) -> Option<String> {
        if !TEL_REGEX.is_match(value) {
            return Some(self.messages.invalid_tel.clone());
        }

        let digits = value.chars().filter(char::is_ascii_digit).count();
        if digits < self.limits.tel_min_digits {
            return Some(self.messages.tel_too_short.clone());
        }

        if value.chars().count() > self.limits.tel_max_length {
            return Some(self.messages.tel_too_long.clone());
        }

        None
    }

    fn validate_textarea(&self, value: &str) -> Option<String> {
        let lines = value.matches('\n').count() + 1;
        if lines > self.limits.textarea_max_lines {
            return Some(with_count(
                &self.messages.too_many_lines,
                self.limits.textarea_max_lines,
            ));
        }

        None
    }
}

/// Case-insensitive scheme check against an allow list.
pub fn is_allowed_scheme(scheme: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|s| s.eq_ignore_ascii_case(scheme))
}
