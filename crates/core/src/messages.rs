//! User-facing messages.
//!
//! Every string a client can see lives here so hosts can translate or reword
//! them through configuration. Templates use `%d` for a single number.

use serde::{Deserialize, Serialize};

macro_rules! messages {
    ($($(#[$doc:meta])* $field:ident => $default:expr,)*) => {
        /// Message catalogue with English defaults.
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(default)]
        pub struct Messages {
            $($(#[$doc])* pub $field: String,)*
        }

        impl Default for Messages {
            fn default() -> Self {
                Self {
                    $($field: $default.to_string(),)*
                }
            }
        }
    };
}

messages! {
    // Structure
    invalid_form_data => "Form data must be an array.",
    empty_form_data => "Form data cannot be empty.",
    /// `%d`: maximum number of fields
    too_many_fields => "Too many form fields. Maximum %d fields allowed.",

    // Field basics
    invalid_field_id => "Invalid field identifier.",
    value_not_text => "Field value must be text.",
    /// `%d`: maximum value length
    value_too_long => "Field value too long. Maximum %d characters allowed.",
    required => "This field is required.",
    /// `%d`: minimum length
    min_length => "Please enter at least %d characters.",
    /// `%d`: maximum length
    max_length => "Please enter no more than %d characters.",

    // Pattern
    invalid_pattern => "Invalid validation pattern.",
    invalid_value => "Please enter a valid value.",

    // Types
    invalid_email => "Please enter a valid email address.",
    email_too_long => "Email address is too long.",
    invalid_url => "Please enter a valid URL.",
    url_too_long => "URL is too long.",
    url_scheme_not_allowed => "URL protocol not allowed.",
    invalid_tel => "Please enter a valid phone number.",
    tel_too_short => "Phone number is too short.",
    tel_too_long => "Phone number is too long.",
    /// `%d`: maximum number of lines
    too_many_lines => "Too many lines. Maximum %d lines allowed.",

    // Responses
    validation_failed => "Please correct the errors below.",
    /// `%d`: minutes until the next submission is allowed
    throttled => "Too many submissions. Please wait %d minutes before submitting again.",
    submission_succeeded => "Form submitted successfully.",
    submission_failed => "Form submission failed. Please try again.",
    processing_failed => "An error occurred while processing your submission.",
    invalid_nonce => "Invalid or missing security token.",
    invalid_request => "Invalid request.",
    request_too_large => "Submission is too large.",

    // Client-side hints
    client_email => "Please enter a valid email address (e.g., user@example.com).",
    client_url => "Please enter a valid URL (e.g., https://example.com).",
    client_tel => "Please enter a valid phone number (e.g., +1-234-567-8900).",
}

/// Substitute the `%d` placeholder in a message template.
pub fn with_count(template: &str, count: impl std::fmt::Display) -> String {
    template.replace("%d", &count.to_string())
}
