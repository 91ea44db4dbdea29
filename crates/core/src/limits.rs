//! Default limits for form submissions.
//!
//! These are the defaults for [`crate::config::ValidationConfig`]; every value
//! can be overridden through configuration.

// === Submission Limits ===

/// Maximum number of fields per submission.
///
/// Guards against oversized payloads built to exhaust validation work.
pub const MAX_FIELDS: usize = 50;

/// Maximum length of a single field value (chars).
pub const MAX_FIELD_LENGTH: usize = 10_000;

/// Maximum length of a field identifier (chars).
pub const MAX_FIELD_ID_LENGTH: usize = 255;

/// Field identifiers: ASCII letters, digits, underscore and hyphen.
pub const FIELD_ID_PATTERN: &str = r"^[a-zA-Z0-9_-]+$";

// === Pattern Limits ===

/// Maximum length of an admin-supplied validation pattern (bytes).
pub const MAX_PATTERN_LENGTH: usize = 200;

/// Regex constructs rejected in admin-supplied patterns.
///
/// Non-capturing groups, lookaround and escape classes.
pub const DENIED_PATTERN_CONSTRUCTS: [&str; 8] =
    ["(?:", "(?=", "(?!", "(?<=", "(?<!", "\\x", "\\u", "\\p"];

/// Compiled size limit for admin-supplied patterns (bytes).
pub const PATTERN_SIZE_LIMIT: usize = 1 << 20;

// === Type Limits ===

/// Email address max length (RFC 5321 envelope limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// URL max length.
pub const MAX_URL_LENGTH: usize = 2048;

/// Telephone raw value max length.
pub const MAX_TEL_LENGTH: usize = 20;

/// Minimum number of digits in a telephone number.
pub const MIN_TEL_DIGITS: usize = 7;

/// Telephone characters: optional leading `+`, digits, whitespace, hyphens, parentheses.
pub const TEL_PATTERN: &str = r"^[+]?[0-9\s\-()]+$";

/// Maximum lines in a textarea value.
pub const MAX_TEXTAREA_LINES: usize = 100;
