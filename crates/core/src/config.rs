//! Validation configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::field_config::FieldRulesConfig;
use crate::limits;
use crate::messages::Messages;

/// Limits and rules applied by the form validator.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ValidationConfig {
    /// Maximum number of fields per submission
    #[serde(default = "default_max_fields")]
    #[validate(range(min = 1))]
    pub max_fields: usize,
    /// Maximum length of any field value (chars)
    #[serde(default = "default_max_field_length")]
    #[validate(range(min = 1))]
    pub max_field_length: usize,
    /// Maximum length of a field identifier (chars)
    #[serde(default = "default_max_field_id_length")]
    #[validate(range(min = 1))]
    pub max_field_id_length: usize,
    /// Maximum length of an admin-supplied pattern
    #[serde(default = "default_max_pattern_length")]
    pub max_pattern_length: usize,
    /// Type-specific limits
    #[serde(default)]
    #[validate(nested)]
    pub types: TypeLimits,
    /// Field type and required-ness inference
    #[serde(default)]
    pub fields: FieldRulesConfig,
    /// User-facing messages
    #[serde(default)]
    pub messages: Messages,
}

fn default_max_fields() -> usize {
    limits::MAX_FIELDS
}

fn default_max_field_length() -> usize {
    limits::MAX_FIELD_LENGTH
}

fn default_max_field_id_length() -> usize {
    limits::MAX_FIELD_ID_LENGTH
}

fn default_max_pattern_length() -> usize {
    limits::MAX_PATTERN_LENGTH
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_fields: default_max_fields(),
            max_field_length: default_max_field_length(),
            max_field_id_length: default_max_field_id_length(),
            max_pattern_length: default_max_pattern_length(),
            types: TypeLimits::default(),
            fields: FieldRulesConfig::default(),
            messages: Messages::default(),
        }
    }
}

/// Limits for the type-specific checks.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TypeLimits {
    #[serde(default = "default_email_max_length")]
    pub email_max_length: usize,
    #[serde(default = "default_url_max_length")]
    pub url_max_length: usize,
    /// URL schemes accepted by url fields
    #[serde(default = "default_allowed_url_schemes")]
    #[validate(length(min = 1))]
    pub allowed_url_schemes: Vec<String>,
    #[serde(default = "default_tel_min_digits")]
    pub tel_min_digits: usize,
    #[serde(default = "default_tel_max_length")]
    pub tel_max_length: usize,
    #[serde(default = "default_textarea_max_lines")]
    #[validate(range(min = 1))]
    pub textarea_max_lines: usize,
}

fn default_email_max_length() -> usize {
    limits::MAX_EMAIL_LENGTH
}

fn default_url_max_length() -> usize {
    limits::MAX_URL_LENGTH
}

fn default_allowed_url_schemes() -> Vec<String> {
    vec!["http".to_string(), "https".to_string()]
}

fn default_tel_min_digits() -> usize {
    limits::MIN_TEL_DIGITS
}

fn default_tel_max_length() -> usize {
    limits::MAX_TEL_LENGTH
}

fn default_textarea_max_lines() -> usize {
    limits::MAX_TEXTAREA_LINES
}

impl Default for TypeLimits {
    fn default() -> Self {
        Self {
            email_max_length: default_email_max_length(),
            url_max_length: default_url_max_length(),
            allowed_url_schemes: default_allowed_url_schemes(),
            tel_min_digits: default_tel_min_digits(),
            tel_max_length: default_tel_max_length(),
            textarea_max_lines: default_textarea_max_lines(),
        }
    }
}
