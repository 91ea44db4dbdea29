//! Sanitization of validated submissions.
//!
//! Values are cleaned according to their inferred field type before they are
//! persisted or sent anywhere.

use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::field_config::{FieldConfigResolver, FieldType};
use crate::field_type::is_allowed_scheme;
use crate::submission::{SanitizedSubmission, Submission};
use url::Url;

static SCRIPT_STYLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)[^>]*?>.*?</(script|style)>").expect("invalid script pattern")
});

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>?").expect("invalid tag pattern"));

static OCTET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("invalid octet pattern"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("invalid whitespace pattern"));

const EMAIL_LOCAL_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~.-";

/// Cleans submission values by field type.
#[derive(Clone)]
pub struct Sanitizer {
    resolver: Arc<dyn FieldConfigResolver>,
    allowed_url_schemes: Vec<String>,
}

impl Sanitizer {
    pub fn new(resolver: Arc<dyn FieldConfigResolver>, allowed_url_schemes: Vec<String>) -> Self {
        Self {
            resolver,
            allowed_url_schemes,
        }
    }

    /// Sanitize every textual field. Keys are normalised with [`sanitize_key`];
    /// ids that normalise to the same key keep the last value.
    pub fn sanitize(&self, submission: &Submission) -> SanitizedSubmission {
        submission
            .iter()
            .filter_map(|(field_id, value)| {
                let value = value.as_str()?;
                let field_type = self.resolver.resolve(field_id).field_type;
                Some((sanitize_key(field_id), self.sanitize_value(value, field_type)))
            })
            .collect()
    }

    pub fn sanitize_value(&self, value: &str, field_type: FieldType) -> String {
        match field_type {
            FieldType::Textarea => sanitize_textarea(value),
            FieldType::Email => sanitize_email(value),
            FieldType::Url => sanitize_url(value, &self.allowed_url_schemes),
            FieldType::Text | FieldType::Tel => sanitize_text(value),
        }
    }
}

/// Lower-case and keep only `[a-z0-9_-]`.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Remove tags, including the content of script and style blocks.
pub fn strip_tags(value: &str) -> String {
    let without_blocks = SCRIPT_STYLE_REGEX.replace_all(value, "");
    TAG_REGEX.replace_all(&without_blocks, "").into_owned()
}

/// Single-line text: strip tags, collapse whitespace, drop percent-encoded octets.
pub fn sanitize_text(value: &str) -> String {
    let stripped = strip_tags(value);
    let collapsed = WHITESPACE_REGEX.replace_all(&stripped, " ");
    OCTET_REGEX.replace_all(&collapsed, "").trim().to_string()
}

/// Multi-line text: like [`sanitize_text`] but newlines and spacing are kept.
pub fn sanitize_textarea(value: &str) -> String {
    let stripped = strip_tags(value);
    OCTET_REGEX.replace_all(&stripped, "").trim().to_string()
}

/// Drop characters not allowed in an address and lower-case the domain.
pub fn sanitize_email(value: &str) -> String {
    let value = value.trim();
    let Some((local, domain)) = value.rsplit_once('@') else {
        return String::new();
    };

    let local: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || EMAIL_LOCAL_SPECIALS.contains(*c))
        .collect();
    let domain: String = domain
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-')
        .collect();
    let domain = domain.trim_matches('.');

    if local.is_empty() || domain.is_empty() {
        return String::new();
    }

    format!("{local}@{domain}")
}

/// Re-serialise through the URL parser. Unparseable or disallowed URLs become empty.
pub fn sanitize_url(value: &str, allowed_schemes: &[String]) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    match Url::parse(&cleaned) {
        Ok(url) if is_allowed_scheme(url.scheme(), allowed_schemes) => url.to_string(),
        _ => String::new(),
    }
}
